//! Focus-offset calculation.
//!
//! Given the focused field's geometry, keyboard geometry, scroll offset
//! and the container offset correction, derive the vertical translation
//! that keeps the field visible. The two platform policies differ because
//! their keyboard geometry differs: Android reports frames before the
//! keyboard animation settles, so near the boundary a coarse
//! quarter-height nudge replaces the precise formula unless a container
//! offset correction is in play; iOS geometry is authoritative
//! immediately, so the scroll offset enters the trigger condition
//! directly and insets are corrected on the bottom edge.
//!
//! No clamping happens here. The coordinator applies the value as
//! computed; over-scroll prevention is the caller's call.

use crate::geometry::SafeAreaInsets;
use crate::registry::FieldRecord;

/// Target platform policy, selected once when the scope mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Lead-in before the very first transition after mount; matched to
    /// when the first animation visually registers on each platform.
    pub fn first_transition_delay_millis(self) -> u64 {
        match self {
            Platform::Android => 150,
            Platform::Ios => 16,
        }
    }
}

/// Everything the translation depends on besides the focused record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TranslationInputs {
    pub container_offset: f32,
    pub scroll_offset: f32,
    pub keyboard_end_y: f32,
    pub padding: f32,
    pub insets: SafeAreaInsets,
}

/// Translation for the current focus, or 0 when nothing is focused.
pub fn translation_for(
    platform: Platform,
    focus: Option<&FieldRecord>,
    inputs: &TranslationInputs,
) -> f32 {
    match focus {
        None => 0.0,
        Some(focus) => match platform {
            Platform::Android => android_translation(focus, inputs),
            Platform::Ios => ios_translation(focus, inputs),
        },
    }
}

/// Android policy. Note the padding sits inside the absolute value, so a
/// large padding can flip the inner sign before the magnitude is taken;
/// the relationship is deliberately non-monotonic.
pub fn android_translation(focus: &FieldRecord, inputs: &TranslationInputs) -> f32 {
    let triggered =
        focus.position + inputs.container_offset > inputs.keyboard_end_y - focus.height * 2.0;
    if !triggered {
        return 0.0;
    }

    if inputs.container_offset > 0.0 {
        let diff = (inputs.keyboard_end_y
            - focus.position
            - focus.height
            - inputs.padding
            + inputs.scroll_offset
            - inputs.container_offset)
            .abs()
            + inputs.insets.top;
        return -diff;
    }

    -(focus.height / 4.0).abs()
}

/// iOS policy.
pub fn ios_translation(focus: &FieldRecord, inputs: &TranslationInputs) -> f32 {
    let triggered = focus.position + inputs.container_offset
        > inputs.keyboard_end_y - focus.height + inputs.scroll_offset;
    if !triggered {
        return 0.0;
    }

    -(inputs.keyboard_end_y
        - focus.position
        - focus.height
        - inputs.padding
        + inputs.scroll_offset
        - inputs.container_offset
        - inputs.insets.bottom)
        .abs()
}

#[cfg(test)]
#[path = "tests/calculator_tests.rs"]
mod tests;
