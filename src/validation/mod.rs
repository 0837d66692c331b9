/*!
 * Validation module for subtitle file integrity.
 *
 * This module produces structured diagnostics for a parsed collection:
 * - Minimum subtitle count
 * - Sequential index numbering
 * - Timing validity, duration bounds and overlaps (`timecodes`)
 * - Text length bounds and control characters (`length`)
 *
 * # Architecture
 *
 * - `timecodes`: Timing, duration and overlap rules
 * - `length`: Text length and control character rules
 * - `service`: Options, diagnostics and orchestration of all rules
 */

pub mod timecodes;
pub mod length;
pub mod service;

// Re-export main types
pub use service::{
    validate_subtitles, ValidationError, ValidationErrorKind, ValidationOptions, ValidationService,
};
