//! modelcast - declarative typed record models from loosely-typed input
//!
//! Consumers define record types as named, ordered sets of typed
//! fields, then construct or populate instances from raw keyword maps
//! or nested JSON. Resolution coerces scalars, recursively builds
//! nested instances, picks among candidate types for polymorphic
//! embedded and list fields, injects defaults, and reports the first
//! failure as a [`ValidationError`] with a field path.
//!
//! ```
//! use modelcast::{FieldDecl, Model};
//! use serde_json::json;
//!
//! let car = Model::builder("Car")
//!     .field("brand", FieldDecl::string())
//!     .build()
//!     .unwrap();
//! let parking = Model::builder("ParkingPlace")
//!     .field("location", FieldDecl::string())
//!     .field("car", FieldDecl::embedded(car.clone()))
//!     .build()
//!     .unwrap();
//!
//! let place = parking
//!     .construct_json(json!({
//!         "location": "somewhere",
//!         "car": {"brand": "awesome brand"},
//!     }))
//!     .unwrap();
//! let nested = place.get("car").unwrap().as_model().unwrap();
//! assert!(nested.is_of(&car));
//! assert_eq!(nested.get("brand").unwrap().as_str(), Some("awesome brand"));
//! ```

pub mod errors;
pub mod instance;
mod resolver;
pub mod types;
pub mod value;

pub use errors::{ValidationError, ValidationResult};
pub use instance::Instance;
pub use types::{FieldDecl, FieldDefault, FieldKind, ItemKind, Model, ModelBuilder, ScalarKind};
pub use value::{Map, Value};
