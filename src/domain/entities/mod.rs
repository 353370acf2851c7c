//! Domain entity definitions.

mod characteristic;
mod entity_id;
mod offering;
mod price;
mod specification;
mod store_offering;
mod token;
mod user;

pub use characteristic::{Characteristic, CharacteristicPayload, UnitOfMeasure};
pub use entity_id::EntityId;
pub use offering::{
    LifecycleStatus, Offering, OfferingPayload, PublishRequirement, SalesChannel,
    missing_publish_requirements,
};
pub use price::{Currency, Price, PricePayload};
pub use specification::{Specification, SpecificationPayload};
pub use store_offering::{
    SearchPage, StoreCharacteristic, StoreOffering, StorePrice, StoreSpecification,
};
pub use token::AuthToken;
pub use user::User;
