//! Data models
//!
//! Lookup results, nutrients and auth payloads exchanged with the calorie API.

mod lookup;
mod nutrient;
mod user;

pub use lookup::{
    BaseLookupResult, Conversion, ConversionBasis, LookupResult, MeasurementMode,
    ScaledLookupResult,
};
pub use nutrient::{scale_nutrients, Nutrient};
pub use user::{AuthResponse, CalorieRequest, LoginRequest, RegisterRequest, User};
