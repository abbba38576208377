use serde::{Deserialize, Serialize};

use crate::area::AreaId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub area_id: AreaId,
    pub age: f64,
    pub gender: Gender,
    #[serde(default)]
    pub is_pro_user: bool,
    #[serde(default)]
    pub total_matches: u64,
}

/// Upstream payload for the users endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Gender as reported upstream. Only "M" and "F" are counted by the
/// gender split; anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Other(value),
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Male => "M".to_string(),
            Gender::Female => "F".to_string(),
            Gender::Other(raw) => raw,
        }
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Gender, UserList};

    #[test]
    fn parses_user_list_and_keeps_unknown_gender_verbatim() {
        let payload = r#"{"users": [
            {"user_id": "0001", "area_id": 3, "age": 27, "gender": "F", "is_pro_user": true, "total_matches": 12},
            {"user_id": "0002", "area_id": 4, "age": 31.5, "gender": "x", "is_pro_user": false, "total_matches": 0}
        ]}"#;

        let list: UserList = serde_json::from_str(payload).expect("users payload should parse");
        assert_eq!(list.users.len(), 2);
        assert_eq!(list.users[0].gender, Gender::Female);
        assert!(list.users[0].is_pro_user);
        assert_eq!(list.users[0].total_matches, 12);
        assert_eq!(list.users[1].gender, Gender::Other("x".to_string()));
        assert!((list.users[1].age - 31.5).abs() < f64::EPSILON);

        let encoded = serde_json::to_value(&list.users[1]).expect("user should serialize");
        assert_eq!(encoded["gender"], "x");
    }

    #[test]
    fn gender_codes_are_case_sensitive() {
        assert_eq!(Gender::from("M"), Gender::Male);
        assert_eq!(Gender::from("m"), Gender::Other("m".to_string()));
    }
}
