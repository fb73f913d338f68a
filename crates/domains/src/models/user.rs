use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::closed_enum;
use crate::error::{DomainError, Result};

closed_enum! {
    /// Dietary restriction tags a user can declare.
    pub enum DietaryRestriction {
        None => "None",
        Halal => "Halal",
        Kosher => "Kosher",
        Vegetarian => "Vegetarian",
        Vegan => "Vegan",
        Pescatarian => "Pescatarian",
        GlutenFree => "Gluten-Free",
        DairyFree => "Dairy-Free",
        NutFree => "Nut-Free",
        ShellfishFree => "Shellfish-Free",
        LowCarb => "Low-Carb",
        Keto => "Keto",
        Paleo => "Paleo",
    }
    default = None;
}

closed_enum! {
    pub enum Cleanliness {
        VeryClean => "very-clean",
        Clean => "clean",
        Moderate => "moderate",
        Relaxed => "relaxed",
    }
    default = Moderate;
}

closed_enum! {
    pub enum SleepSchedule {
        EarlyBird => "early-bird",
        NightOwl => "night-owl",
        Flexible => "flexible",
    }
    default = Flexible;
}

closed_enum! {
    /// How often the user is comfortable having guests over.
    pub enum GuestComfort {
        Frequently => "frequently",
        Occasionally => "occasionally",
        Rarely => "rarely",
        Never => "never",
    }
    default = Occasionally;
}

closed_enum! {
    pub enum PreferredGender {
        Male => "male",
        Female => "female",
        Any => "any",
    }
    default = Any;
}

/// Monthly budget in whole dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    pub min: i64,
    pub max: i64,
}

impl Budget {
    pub fn is_valid(&self) -> bool {
        self.min >= 0 && self.max >= self.min
    }

    /// `$<min> - $<max>`
    pub fn summary(&self) -> String {
        format!("${} - ${}", self.min, self.max)
    }
}

/// Preferred roommate age range, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeRange {
    pub min: i32,
    pub max: i32,
}

impl AgeRange {
    pub const YOUNGEST: i32 = 18;
    pub const OLDEST: i32 = 100;

    pub fn is_valid(&self) -> bool {
        self.min >= Self::YOUNGEST && self.max >= self.min && self.max <= Self::OLDEST
    }
}

impl Default for AgeRange {
    fn default() -> Self {
        Self {
            min: Self::YOUNGEST,
            max: Self::OLDEST,
        }
    }
}

/// The matching preferences stored on every profile.
///
/// Every field falls back to its schema default when missing from a stored
/// document, so records written before a field existed still decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub smokes: bool,
    pub drinks: bool,
    pub prefers_pets: bool,
    pub cleanliness: Cleanliness,
    pub sleep_schedule: SleepSchedule,
    pub guest_comfort: GuestComfort,
    pub budget: Budget,
    pub preferred_gender: PreferredGender,
    pub age_range: AgeRange,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dietary_restrictions: vec![DietaryRestriction::None],
            smokes: false,
            drinks: false,
            prefers_pets: false,
            cleanliness: Cleanliness::default(),
            sleep_schedule: SleepSchedule::default(),
            guest_comfort: GuestComfort::default(),
            budget: Budget::default(),
            preferred_gender: PreferredGender::default(),
            age_range: AgeRange::default(),
        }
    }
}

impl Preferences {
    /// Restrictions other than the `None` placeholder.
    pub fn declared_restrictions(&self) -> impl Iterator<Item = DietaryRestriction> + '_ {
        self.dietary_restrictions
            .iter()
            .copied()
            .filter(|r| *r != DietaryRestriction::None)
    }
}

/// A registered user. `firebase_uid` and `email` are unique and immutable after signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub firebase_uid: String,
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
    pub current_city: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// A freshly signed-up user with every preference at its default.
    pub fn new(firebase_uid: String, email: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            firebase_uid,
            email,
            name,
            photo: None,
            current_city: None,
            nationality: None,
            occupation: None,
            preferences: Preferences::default(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }
}

/// Input for `signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: secrecy::SecretString,
    #[serde(default)]
    pub name: String,
}

fn empty_secret() -> secrecy::SecretString {
    secrecy::SecretString::from(String::new())
}

/// Fields a patch may never touch.
pub const IMMUTABLE_PROFILE_FIELDS: [&str; 2] = ["firebaseUid", "email"];

/// A loosely typed profile patch, exactly as submitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub current_city: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub smokes: Option<bool>,
    pub drinks: Option<bool>,
    pub prefers_pets: Option<bool>,
    pub cleanliness: Option<String>,
    pub sleep_schedule: Option<String>,
    pub guest_comfort: Option<String>,
    pub preferred_gender: Option<String>,
    pub budget: Option<RangeInput>,
    pub age_range: Option<RangeInput>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeInput {
    pub min: i64,
    pub max: i64,
}

impl ProfilePatch {
    /// Strips the immutable fields, then decodes what is left.
    pub fn from_document(mut document: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        for field in IMMUTABLE_PROFILE_FIELDS {
            document.remove(field);
        }
        serde_json::from_value(serde_json::Value::Object(document))
            .map_err(|e| DomainError::invalid(format!("Invalid profile update: {e}")))
    }

    /// Checks the constrained fields in a fixed order and stops at the first failure.
    pub fn validate(self) -> Result<ProfileUpdate> {
        let cleanliness = parse_choice(self.cleanliness, "Invalid cleanliness value")?;

        let dietary_restrictions = match self.dietary_restrictions {
            Some(values) => Some(
                values
                    .iter()
                    .map(|v| v.parse::<DietaryRestriction>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| DomainError::invalid("Invalid dietary restriction value(s)"))?,
            ),
            None => None,
        };

        let sleep_schedule = parse_choice(self.sleep_schedule, "Invalid sleep schedule value")?;
        let guest_comfort = parse_choice(self.guest_comfort, "Invalid guest comfort value")?;
        let preferred_gender =
            parse_choice(self.preferred_gender, "Invalid preferred gender value")?;

        let budget = match self.budget {
            Some(range) => {
                let budget = Budget {
                    min: range.min,
                    max: range.max,
                };
                if !budget.is_valid() {
                    return Err(DomainError::invalid("Invalid budget range"));
                }
                Some(budget)
            }
            None => None,
        };

        let age_range = match self.age_range {
            Some(range) => {
                let (Ok(min), Ok(max)) = (i32::try_from(range.min), i32::try_from(range.max))
                else {
                    return Err(DomainError::invalid("Invalid age range"));
                };
                let ages = AgeRange { min, max };
                if !ages.is_valid() {
                    return Err(DomainError::invalid("Invalid age range"));
                }
                Some(ages)
            }
            None => None,
        };

        Ok(ProfileUpdate {
            name: self.name,
            photo: self.photo,
            current_city: self.current_city,
            nationality: self.nationality,
            occupation: self.occupation,
            dietary_restrictions,
            smokes: self.smokes,
            drinks: self.drinks,
            prefers_pets: self.prefers_pets,
            cleanliness,
            sleep_schedule,
            guest_comfort,
            preferred_gender,
            budget,
            age_range,
        })
    }
}

fn parse_choice<T: std::str::FromStr>(raw: Option<String>, message: &str) -> Result<Option<T>> {
    raw.map(|value| value.parse::<T>().map_err(|_| DomainError::invalid(message)))
        .transpose()
}

/// A validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub current_city: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub dietary_restrictions: Option<Vec<DietaryRestriction>>,
    pub smokes: Option<bool>,
    pub drinks: Option<bool>,
    pub prefers_pets: Option<bool>,
    pub cleanliness: Option<Cleanliness>,
    pub sleep_schedule: Option<SleepSchedule>,
    pub guest_comfort: Option<GuestComfort>,
    pub preferred_gender: Option<PreferredGender>,
    pub budget: Option<Budget>,
    pub age_range: Option<AgeRange>,
}

impl ProfileUpdate {
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        set(&mut user.name, &self.name);
        set_opt(&mut user.photo, &self.photo);
        set_opt(&mut user.current_city, &self.current_city);
        set_opt(&mut user.nationality, &self.nationality);
        set_opt(&mut user.occupation, &self.occupation);

        let prefs = &mut user.preferences;
        set(&mut prefs.dietary_restrictions, &self.dietary_restrictions);
        set(&mut prefs.smokes, &self.smokes);
        set(&mut prefs.drinks, &self.drinks);
        set(&mut prefs.prefers_pets, &self.prefers_pets);
        set(&mut prefs.cleanliness, &self.cleanliness);
        set(&mut prefs.sleep_schedule, &self.sleep_schedule);
        set(&mut prefs.guest_comfort, &self.guest_comfort);
        set(&mut prefs.preferred_gender, &self.preferred_gender);
        set(&mut prefs.budget, &self.budget);
        set(&mut prefs.age_range, &self.age_range);

        user.updated_at = now;
    }
}

// ── Projections ─────────────────────────────────────────────────────────────

/// Serialized profile. The subject id is only present in the full view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase_uid: Option<String>,
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
    pub current_city: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    #[serde(flatten)]
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserView {
    pub fn full(user: User) -> Self {
        let firebase_uid = Some(user.firebase_uid.clone());
        Self {
            firebase_uid,
            ..Self::public(user)
        }
    }

    pub fn public(user: User) -> Self {
        Self {
            id: user.id,
            firebase_uid: None,
            email: user.email,
            name: user.name,
            photo: user.photo,
            current_city: user.current_city,
            nationality: user.nationality,
            occupation: user.occupation,
            preferences: user.preferences,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Returned by `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for LoginSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

const NOT_SPECIFIED: &str = "Not specified";

/// Reduced profile shown next to posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiniProfile {
    pub name: String,
    pub photo: String,
    pub location: String,
    pub occupation: String,
    pub preferences: MiniPreferences,
    pub budget: Budget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniPreferences {
    pub smokes: bool,
    pub drinks: bool,
    pub prefers_pets: bool,
    pub cleanliness: Cleanliness,
}

impl From<User> for MiniProfile {
    fn from(user: User) -> Self {
        let prefs = user.preferences;
        Self {
            name: user.name,
            photo: user.photo.unwrap_or_default(),
            location: user.current_city.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            occupation: user.occupation.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            preferences: MiniPreferences {
                smokes: prefs.smokes,
                drinks: prefs.drinks,
                prefers_pets: prefs.prefers_pets,
                cleanliness: prefs.cleanliness,
            },
            budget: prefs.budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> Result<ProfileUpdate> {
        let serde_json::Value::Object(map) = value else {
            panic!("patch must be an object");
        };
        ProfilePatch::from_document(map)?.validate()
    }

    #[test]
    fn legacy_documents_decode_with_defaults() {
        let prefs: Preferences = serde_json::from_value(json!({ "smokes": true })).unwrap();
        assert!(prefs.smokes);
        assert_eq!(prefs.dietary_restrictions, vec![DietaryRestriction::None]);
        assert_eq!(prefs.cleanliness, Cleanliness::Moderate);
        assert_eq!(prefs.sleep_schedule, SleepSchedule::Flexible);
        assert_eq!(prefs.guest_comfort, GuestComfort::Occasionally);
        assert_eq!(prefs.budget, Budget { min: 0, max: 0 });
        assert_eq!(prefs.age_range, AgeRange { min: 18, max: 100 });
    }

    #[test]
    fn enums_use_their_wire_names() {
        assert_eq!(
            serde_json::to_value(DietaryRestriction::GlutenFree).unwrap(),
            json!("Gluten-Free")
        );
        assert_eq!("night-owl".parse::<SleepSchedule>().unwrap(), SleepSchedule::NightOwl);
        assert!("filthy".parse::<Cleanliness>().is_err());
        assert_eq!(DietaryRestriction::ALL.len(), 13);
    }

    #[test]
    fn immutable_fields_are_dropped_before_validation() {
        let update = patch(json!({
            "firebaseUid": 42,
            "email": ["not", "a", "string"],
            "name": "Robin"
        }))
        .unwrap();
        assert_eq!(update.name.as_deref(), Some("Robin"));
    }

    #[test]
    fn first_failing_field_is_reported() {
        let err = patch(json!({
            "cleanliness": "filthy",
            "sleepSchedule": "never-sleeps"
        }))
        .unwrap_err();
        assert_eq!(err, DomainError::invalid("Invalid cleanliness value"));

        let err = patch(json!({ "dietaryRestrictions": ["Vegan", "Carnivore"] })).unwrap_err();
        assert_eq!(err, DomainError::invalid("Invalid dietary restriction value(s)"));

        let err = patch(json!({ "guestComfort": "always" })).unwrap_err();
        assert_eq!(err, DomainError::invalid("Invalid guest comfort value"));

        let err = patch(json!({ "preferredGender": "robot" })).unwrap_err();
        assert_eq!(err, DomainError::invalid("Invalid preferred gender value"));
    }

    #[test]
    fn ranges_are_bounded() {
        assert!(patch(json!({ "budget": { "min": 500, "max": 1500 } })).is_ok());
        assert!(patch(json!({ "budget": { "min": -1, "max": 10 } })).is_err());
        assert!(patch(json!({ "budget": { "min": 900, "max": 100 } })).is_err());

        assert!(patch(json!({ "ageRange": { "min": 18, "max": 100 } })).is_ok());
        assert!(patch(json!({ "ageRange": { "min": 17, "max": 30 } })).is_err());
        assert!(patch(json!({ "ageRange": { "min": 30, "max": 29 } })).is_err());
        assert!(patch(json!({ "ageRange": { "min": 30, "max": 101 } })).is_err());
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let now = Utc::now();
        let mut user = User::new("uid-1".into(), "a@x.com".into(), "A".into(), now);
        let update = patch(json!({ "cleanliness": "very-clean", "occupation": "Nurse" })).unwrap();
        update.apply_to(&mut user, now);

        assert_eq!(user.preferences.cleanliness, Cleanliness::VeryClean);
        assert_eq!(user.occupation.as_deref(), Some("Nurse"));
        assert_eq!(user.preferences.sleep_schedule, SleepSchedule::Flexible);
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn public_view_hides_subject_id() {
        let user = User::new("uid-1".into(), "a@x.com".into(), "A".into(), Utc::now());
        let public = serde_json::to_value(UserView::public(user.clone())).unwrap();
        let full = serde_json::to_value(UserView::full(user)).unwrap();

        assert!(public.get("firebaseUid").is_none());
        assert_eq!(full["firebaseUid"], "uid-1");
        assert_eq!(public["dietaryRestrictions"], json!(["None"]));
    }

    #[test]
    fn mini_profile_fills_missing_text() {
        let user = User::new("uid-1".into(), "a@x.com".into(), "A".into(), Utc::now());
        let mini = MiniProfile::from(user);
        assert_eq!(mini.photo, "");
        assert_eq!(mini.location, "Not specified");
        assert_eq!(mini.occupation, "Not specified");
    }
}
