use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Favorite;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    /// Accepted as a string so a malformed id yields 400 instead of a
    /// deserialization rejection.
    pub product_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteList {
    #[schema(value_type = Vec<Favorite>)]
    pub items: Vec<Favorite>,
}
