//! Application layer: session, forms, table state, publish watching and store browsing.

/// Data transfer objects.
pub mod dto;
/// Entity forms.
pub mod forms;
/// Stateful services used by the screens.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{LoginRequest, LoginResponse, TokenResponse};
pub use use_cases::LoginUseCase;
