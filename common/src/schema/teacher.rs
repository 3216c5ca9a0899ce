use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualification {
    pub id: String,
    pub skill: String,
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub role: String,
    pub birthdate: NaiveDate,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub private_qualifications: Vec<Qualification>,
    #[serde(default)]
    pub group_qualifications: Vec<Qualification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Partial profile update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherUpdate {
    pub name: Option<String>,
    pub role: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub private_qualifications: Option<Vec<Qualification>>,
    pub group_qualifications: Option<Vec<Qualification>>,
    pub avatar: Option<String>,
}

impl TeacherUpdate {
    pub fn apply_to(self, teacher: &Teacher) -> Teacher {
        let mut updated = teacher.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(role) = self.role {
            updated.role = role;
        }
        if let Some(birthdate) = self.birthdate {
            updated.birthdate = birthdate;
        }
        if let Some(email) = self.email {
            updated.email = email;
        }
        if let Some(phone) = self.phone {
            updated.phone = phone;
        }
        if let Some(address) = self.address {
            updated.address = address;
        }
        if let Some(qualifications) = self.private_qualifications {
            updated.private_qualifications = qualifications;
        }
        if let Some(qualifications) = self.group_qualifications {
            updated.group_qualifications = qualifications;
        }
        if self.avatar.is_some() {
            updated.avatar = self.avatar;
        }
        updated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Free,
    Booked,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub teacher_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub teacher_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub status: LessonStatus,
    pub invoiced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub teacher_id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub teacher_id: String,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher() -> Teacher {
        Teacher {
            id: "1".to_string(),
            name: "Sarah Johnson".to_string(),
            role: "Senior Music Teacher".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1985, 3, 15).unwrap(),
            email: "sarah.johnson@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            address: "123 Main St".to_string(),
            private_qualifications: vec![],
            group_qualifications: vec![],
            avatar: None,
        }
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let update: TeacherUpdate =
            serde_json::from_str(r#"{"phone":"+1 (555) 000-0000","role":"Head of Music"}"#).unwrap();
        let original = teacher();
        let updated = update.apply_to(&original);

        assert_eq!(updated.phone, "+1 (555) 000-0000");
        assert_eq!(updated.role, "Head of Music");
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.email, original.email);
    }
}
