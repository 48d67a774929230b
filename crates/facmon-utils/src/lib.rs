/*
 * Copyright (c) 2025 Facmon Contributors
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

pub mod config;
pub mod logging;
pub mod tunnel;

pub use config::Settings;
pub use logging::FacmonLogger;
