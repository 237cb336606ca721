use serde::{Deserialize, Serialize};

/// A row of the `users` table. The id is assigned by the datastore and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Raw body of `POST /users/push`. All fields stay optional here so that
/// field checks report through the validation result instead of a
/// deserialization failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Raw body of `POST /users/update`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUser {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A create payload that passed validation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// A partial update that passed validation: at least one field is `Some`, and
/// no field holds an empty string.
#[derive(Debug, Clone)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}
