//! Contact form fixture
//!
//! ```text
//! root (group)            firstNameNotSameAsLast | uniqueFirstAndLastName
//! ├── firstName           required
//! ├── lastName            required
//! ├── email               required, email | uniqueEmail
//! ├── phone               required, phoneNumber
//! ├── emergencyContacts   (array) required | arrayLengthError
//! └── doctorInfo (group)  firstNameNotSameAsLast | uniqueFirstAndLastName
//!     ├── firstName       required
//!     ├── lastName        required
//!     └── email           required, email | uniqueEmail, blacklistedEmail
//! ```

use hubfx_forms::ControlConfig;

use crate::async_validators::{array_length_error, blacklisted_email, unique_email, unique_first_and_last_name};
use crate::validators::{email, first_name_not_same_as_last, phone_number, required};

fn name_field(initial: &str) -> ControlConfig {
    ControlConfig::field(initial).with_validators(vec![required()])
}

/// The contact form with no emergency contacts.
pub fn contact_form_config() -> ControlConfig {
    ControlConfig::group([
        ("firstName", name_field("")),
        ("lastName", name_field("")),
        (
            "email",
            ControlConfig::field("")
                .with_validators(vec![required(), email()])
                .with_async_validators(vec![unique_email()]),
        ),
        (
            "phone",
            ControlConfig::field("").with_validators(vec![required(), phone_number()]),
        ),
        (
            "emergencyContacts",
            ControlConfig::array([])
                .with_validators(vec![required()])
                .with_async_validators(vec![array_length_error()]),
        ),
        (
            "doctorInfo",
            ControlConfig::group([
                ("firstName", name_field("")),
                ("lastName", name_field("")),
                (
                    "email",
                    ControlConfig::field("")
                        .with_validators(vec![required(), email()])
                        .with_async_validators(vec![unique_email(), blacklisted_email()]),
                ),
            ])
            .with_validators(vec![first_name_not_same_as_last()])
            .with_async_validators(vec![unique_first_and_last_name()]),
        ),
    ])
    .with_validators(vec![first_name_not_same_as_last()])
    .with_async_validators(vec![unique_first_and_last_name()])
}

/// One emergency contact group.
pub fn emergency_contact_config(first_name: &str, last_name: &str, email_address: &str) -> ControlConfig {
    ControlConfig::group([
        ("firstName", name_field(first_name)),
        ("lastName", name_field(last_name)),
        (
            "email",
            ControlConfig::field(email_address)
                .with_validators(vec![required(), email()])
                .with_async_validators(vec![unique_email(), blacklisted_email()]),
        ),
        ("relation", name_field("friend")),
    ])
    .with_validators(vec![first_name_not_same_as_last()])
    .with_async_validators(vec![unique_first_and_last_name()])
}

/// Homer and Moe.
pub fn emergency_contact_configs() -> Vec<ControlConfig> {
    vec![
        emergency_contact_config("Homer", "Simpson", "homer@homer.com"),
        emergency_contact_config("moe", "syzlak", "moe@moe.com"),
    ]
}

/// The contact form with Homer and Moe as emergency contacts.
pub fn contact_form_with_contacts_config() -> ControlConfig {
    let mut config = contact_form_config();
    if let hubfx_forms::ControlConfigKind::Group { controls } = &mut config.kind {
        controls.insert(
            "emergencyContacts".to_string(),
            std::sync::Arc::new(
                ControlConfig::array(emergency_contact_configs())
                    .with_validators(vec![required()])
                    .with_async_validators(vec![array_length_error()]),
            ),
        );
    }
    config
}
