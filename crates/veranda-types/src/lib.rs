pub mod geo;
pub mod models;

pub use geo::{BrowserFix, Coordinates, FixStatus, GeoRecord, ProviderFailure, ProviderReading};
pub use models::{
    AttachmentDescriptor, AttachmentUpload, Message, MessageDraft, ValidationError, VisitEvent,
};
