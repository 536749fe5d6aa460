pub mod api;
pub mod config;
pub mod controller;
pub mod dialog;
pub mod error;
pub mod notification;
pub mod store;
pub mod view;

pub use api::{HttpSpotApi, SpotApi};
pub use controller::{
    ControllerEvent, ControllerOptions, ControllerSnapshot, MutationOutcome, OperationState,
    SpotController,
};
pub use dialog::{DialogState, SpotDraft};
pub use notification::{Notification, Severity};
pub use view::{SpotPage, ViewState};
