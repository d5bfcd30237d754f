use crate::error::AppError;
use serde::{Deserialize, Serialize};

// Stored records

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub holes: i64,
    pub par_course: i64,
    pub par_front_nine: Option<i64>,
    pub par_back_nine: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeeInfo {
    pub id: i64,
    pub course_id: i64,
    pub tee_color: String,
    pub out_yardage: Option<i64>,
    pub in_yardage: Option<i64>,
    pub total_yardage: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoleData {
    pub id: i64,
    pub course_id: i64,
    pub hole_number: i64,
    pub par: i64,
    pub handicap: i64,
    pub tee_color: String,
    pub yardage: i64,
}

// Validated inputs, ready to be written

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub holes: i64,
    pub par_course: i64,
    pub par_front_nine: Option<i64>,
    pub par_back_nine: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTeeInfo {
    pub course_id: i64,
    pub tee_color: String,
    pub out_yardage: Option<i64>,
    pub in_yardage: Option<i64>,
    pub total_yardage: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHoleData {
    pub course_id: i64,
    pub hole_number: i64,
    pub par: i64,
    pub handicap: i64,
    pub tee_color: String,
    pub yardage: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

// Request payloads. Every field is optional at the parsing stage so that a
// missing field surfaces as a validation message instead of a parse failure.

#[derive(Debug, Default, Deserialize)]
pub struct CourseForm {
    #[serde(default, deserialize_with = "opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "opt_int")]
    pub holes: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub par_course: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub par_front_nine: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub par_back_nine: Option<i64>,
}

impl CourseForm {
    pub fn validate(self) -> Result<NewCourse, AppError> {
        const REQUIRED: &str = "Name, holes, par_course are required";

        let name = required_text(self.name).ok_or_else(|| AppError::validation(REQUIRED))?;
        let holes = required_int(self.holes).ok_or_else(|| AppError::validation(REQUIRED))?;
        let par_course =
            required_int(self.par_course).ok_or_else(|| AppError::validation(REQUIRED))?;

        if holes < 0 {
            return Err(AppError::validation("holes must be a positive integer"));
        }

        Ok(NewCourse {
            name,
            address: self.address,
            phone: self.phone,
            holes,
            par_course,
            par_front_nine: self.par_front_nine,
            par_back_nine: self.par_back_nine,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TeeInfoForm {
    #[serde(default, deserialize_with = "opt_int")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "opt_text")]
    pub tee_color: Option<String>,
    #[serde(default, deserialize_with = "opt_int")]
    pub out_yardage: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub in_yardage: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub total_yardage: Option<i64>,
}

impl TeeInfoForm {
    pub fn validate(self) -> Result<NewTeeInfo, AppError> {
        const REQUIRED: &str = "Course ID and tee color are required";

        Ok(NewTeeInfo {
            course_id: required_int(self.course_id).ok_or_else(|| AppError::validation(REQUIRED))?,
            tee_color: required_text(self.tee_color)
                .ok_or_else(|| AppError::validation(REQUIRED))?,
            out_yardage: self.out_yardage,
            in_yardage: self.in_yardage,
            total_yardage: self.total_yardage,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HoleDataForm {
    #[serde(default, deserialize_with = "opt_int")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub hole_number: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub par: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub handicap: Option<i64>,
    #[serde(default, deserialize_with = "opt_text")]
    pub tee_color: Option<String>,
    #[serde(default, deserialize_with = "opt_int")]
    pub yardage: Option<i64>,
}

impl HoleDataForm {
    pub fn validate(self) -> Result<NewHoleData, AppError> {
        let missing = || AppError::validation("All fields are required");

        Ok(NewHoleData {
            course_id: required_int(self.course_id).ok_or_else(missing)?,
            hole_number: required_int(self.hole_number).ok_or_else(missing)?,
            par: required_int(self.par).ok_or_else(missing)?,
            handicap: required_int(self.handicap).ok_or_else(missing)?,
            tee_color: required_text(self.tee_color).ok_or_else(missing)?,
            yardage: required_int(self.yardage).ok_or_else(missing)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl SignupForm {
    pub fn validate(self) -> Result<NewUser, AppError> {
        let missing = || AppError::validation("Username, email and password are required");

        Ok(NewUser {
            username: required_text(self.username).ok_or_else(missing)?,
            email: required_text(self.email).ok_or_else(missing)?,
            // Passwords are taken verbatim, surrounding whitespace included.
            password: self
                .password
                .filter(|p| !p.is_empty())
                .ok_or_else(missing)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// Responses

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoursesResponse {
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

fn required_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Zero counts as absent, the same way an empty string does.
fn required_int(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

// Custom deserializer to handle a number, a numeric string, or null for
// integer columns. Empty strings become None.
fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct OptIntVisitor;

    impl<'de> Visitor<'de> for OptIntVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(OptIntVisitor)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| de::Error::custom(format!("integer {value} is out of range")))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Ok(Some(value as i64))
            } else {
                Err(de::Error::custom(format!("expected a whole number, got {value}")))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid integer '{value}'")))
        }
    }

    deserializer.deserialize_option(OptIntVisitor)
}

// Text columns also accept bare numbers (phone numbers are often sent that way).
fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct OptTextVisitor;

    impl<'de> Visitor<'de> for OptTextVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(OptTextVisitor)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }
    }

    deserializer.deserialize_option(OptTextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn course_form(value: serde_json::Value) -> CourseForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn course_requires_name_holes_and_par() {
        let err = course_form(json!({ "name": "Pebble", "holes": 18 }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Name, holes, par_course are required"));

        let err = course_form(json!({ "name": "  ", "holes": 18, "par_course": 72 }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn course_accepts_numeric_strings() {
        let course = course_form(json!({
            "name": "Pebble",
            "holes": "18",
            "par_course": 72,
            "par_front_nine": "36",
            "phone": 5551234
        }))
        .validate()
        .unwrap();

        assert_eq!(course.holes, 18);
        assert_eq!(course.par_front_nine, Some(36));
        assert_eq!(course.par_back_nine, None);
        assert_eq!(course.phone.as_deref(), Some("5551234"));
    }

    #[test]
    fn course_rejects_negative_hole_count() {
        let err = course_form(json!({ "name": "Pebble", "holes": -9, "par_course": 72 }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("positive")));
    }

    #[test]
    fn zero_and_null_count_as_missing() {
        let err = course_form(json!({ "name": "Pebble", "holes": 0, "par_course": 72 }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = course_form(json!({ "name": "Pebble", "holes": 18, "par_course": null }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn non_numeric_integer_field_fails_to_parse() {
        let parsed: Result<CourseForm, _> =
            serde_json::from_value(json!({ "name": "Pebble", "holes": "eighteen" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn tee_info_requires_course_and_color() {
        let form: TeeInfoForm = serde_json::from_value(json!({ "course_id": 1 })).unwrap();
        let err = form.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Course ID and tee color are required"));

        let form: TeeInfoForm =
            serde_json::from_value(json!({ "course_id": 1, "tee_color": "blue", "total_yardage": 6800 }))
                .unwrap();
        let tee = form.validate().unwrap();
        assert_eq!(tee.tee_color, "blue");
        assert_eq!(tee.total_yardage, Some(6800));
        assert_eq!(tee.out_yardage, None);
    }

    #[test]
    fn hole_data_requires_every_field() {
        let complete = json!({
            "course_id": 1,
            "hole_number": 7,
            "par": 3,
            "handicap": 17,
            "tee_color": "white",
            "yardage": 106
        });
        let hole = serde_json::from_value::<HoleDataForm>(complete.clone())
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(hole.hole_number, 7);

        for field in ["course_id", "hole_number", "par", "handicap", "tee_color", "yardage"] {
            let mut partial = complete.clone();
            partial.as_object_mut().unwrap().remove(field);
            let err = serde_json::from_value::<HoleDataForm>(partial)
                .unwrap()
                .validate()
                .unwrap_err();
            assert!(
                matches!(err, AppError::Validation(ref m) if m == "All fields are required"),
                "missing {field} should be rejected"
            );
        }
    }

    #[test]
    fn signup_keeps_password_verbatim() {
        let user = SignupForm {
            username: Some(" alice ".into()),
            email: Some("a@x.com".into()),
            password: Some(" pw ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, " pw ");

        let err = SignupForm {
            username: Some("alice".into()),
            email: None,
            password: Some("pw".into()),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "secret".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
    }
}
