//! Success envelopes. Resource endpoints wrap their payload in
//! `{"data": ...}`; auth endpoints and `/health` answer bare.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// `{"data": {"message": "<Entity> deleted successfully"}}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn deleted(entity: &str) -> DataResponse<Self> {
        DataResponse::new(Self {
            message: format!("{entity} deleted successfully"),
        })
    }
}
