use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::user::schema::{UserEntity, UserState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub activity: String,
}

/// Profile other users are allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub avatar: Option<String>,
    pub state: UserState,
    pub activity: Option<Activity>,
}

impl From<UserEntity> for PublicUser {
    fn from(user: UserEntity) -> Self {
        let activity = match (user.activity_id, user.activity) {
            (Some(id), Some(activity)) => Some(Activity { id, activity }),
            _ => None,
        };

        PublicUser {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            avatar: user.avatar,
            state: user.state,
            activity,
        }
    }
}

/// The caller's own profile, including private fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub avatar: Option<String>,
    pub email: String,
    pub state: UserState,
    pub activity: Option<Activity>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        let email = entity.email.clone();
        let public = PublicUser::from(entity);

        UserResponse {
            id: public.id,
            username: public.username,
            fullname: public.fullname,
            avatar: public.avatar,
            email,
            state: public.state,
            activity: public.activity,
        }
    }
}
