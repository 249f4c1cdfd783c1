//! Shop profile

use serde::{Deserialize, Serialize};

/// Shop details printed on receipts. Free-text display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    /// Shop name
    pub shop_name: String,

    /// Owner name
    pub owner: String,

    /// Contact phone number
    pub phone: String,

    /// GST identification number, empty when the shop has none
    pub gstin: String,

    /// Postal address
    pub address: String,

    /// Opening hours
    pub hours: String,

    /// Avatar image URL
    pub avatar: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            shop_name: "99 Market".to_string(),
            owner: "Harsh".to_string(),
            phone: "+91-90000-00000".to_string(),
            gstin: String::new(),
            address: "Main Road, City, State".to_string(),
            hours: "9:00 AM \u{2013} 9:00 PM".to_string(),
            avatar: "https://ui-avatars.com/api/?name=99+M&background=f97316&color=fff&bold=true"
                .to_string(),
        }
    }
}

impl Profile {
    /// GSTIN, if one is set.
    pub fn gstin(&self) -> Option<&str> {
        Some(self.gstin.trim()).filter(|gstin| !gstin.is_empty())
    }
}

/// Partial profile update. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New shop name
    pub shop_name: Option<String>,

    /// New owner name
    pub owner: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// New GSTIN; an empty string clears it
    pub gstin: Option<String>,

    /// New address
    pub address: Option<String>,

    /// New opening hours
    pub hours: Option<String>,

    /// New avatar URL
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    /// Check whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the update to a profile.
    pub fn apply_to(self, profile: &mut Profile) {
        let fields = [
            (self.shop_name, &mut profile.shop_name),
            (self.owner, &mut profile.owner),
            (self.phone, &mut profile.phone),
            (self.gstin, &mut profile.gstin),
            (self.address, &mut profile.address),
            (self.hours, &mut profile.hours),
            (self.avatar, &mut profile.avatar),
        ];

        for (value, field) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}
