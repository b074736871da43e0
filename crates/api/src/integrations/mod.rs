//! Outbound HTTP clients for third-party services.
//!
//! - [`enphase`] -- live system summaries from the Enphase Enlighten v4 API.
//! - [`stripe`] -- Checkout Sessions and webhook event interpretation.

pub mod enphase;
pub mod stripe;
