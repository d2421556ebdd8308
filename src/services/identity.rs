//! Stand-in identity provider.
//!
//! There is no authentication yet, so every order is placed on behalf of the
//! same demo customer.

use crate::orders::{Address, User};

pub fn current_user() -> User {
    User {
        email: "federlizer@protonmail.com".to_string(),
        first_name: "Nikola".to_string(),
        last_name: "Velichkov".to_string(),
        ip_address: "146.70.188.231".to_string(),
        phone: "+4550331329".to_string(),
        address: Address {
            line: "My lovely home address line".to_string(),
            country_code: "DK".to_string(),
            city: "Aalborg".to_string(),
            zip_code: "9000".to_string(),
        },
    }
}
