// SPDX-License-Identifier: MIT OR Apache-2.0
//! Evaluation of the keyframe store at a playhead position.

use crate::keyframe::{Frame, Interpolation, Keyframe};
use crate::parameters::ParameterSet;
use crate::store::KeyframeStore;

/// Keyframes surrounding a query frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket<'a> {
    /// No keyframes: live values pass through
    Empty,
    /// Hold a single keyframe (sole keyframe, or query outside the keyed span)
    Hold(Frame, &'a Keyframe),
    /// Between two keyframes
    Between {
        /// Frame and keyframe at or before the query
        prev: (Frame, &'a Keyframe),
        /// Frame and keyframe after the query
        next: (Frame, &'a Keyframe),
    },
}

/// Find the bracket for `frame`.
///
/// Scans keyframes in ascending order and takes the first pair with
/// `prev <= frame < next`. Queries before the first keyframe hold the first,
/// queries at or after the last hold the last.
pub fn bracket(store: &KeyframeStore, frame: f64) -> Bracket<'_> {
    let mut keys = store.iter();
    let Some(first) = keys.next() else {
        return Bracket::Empty;
    };
    if frame < f64::from(first.0) {
        return Bracket::Hold(first.0, first.1);
    }

    let mut prev = first;
    for next in keys {
        if f64::from(prev.0) <= frame && frame < f64::from(next.0) {
            return Bracket::Between { prev, next };
        }
        prev = next;
    }
    Bracket::Hold(prev.0, prev.1)
}

/// Effective parameters at `frame`.
///
/// Every name of `live` is produced, in `live`'s order. A name missing from an
/// endpoint keyframe uses the live value for that endpoint. The function is
/// pure and accepts fractional or out-of-range frames.
pub fn value_at(store: &KeyframeStore, frame: f64, live: &ParameterSet) -> ParameterSet {
    match bracket(store, frame) {
        Bracket::Empty => live.clone(),
        Bracket::Hold(_, keyframe) => live
            .iter()
            .map(|(name, live_value)| (name, keyframe.value(name).unwrap_or(live_value)))
            .collect(),
        Bracket::Between { prev, next } => {
            let t = Interpolation::fraction(f64::from(prev.0), f64::from(next.0), frame);
            let t = prev.1.interpolation.shape(t);
            live.iter()
                .map(|(name, live_value)| {
                    let a = prev.1.value(name).unwrap_or(live_value);
                    let b = next.1.value(name).unwrap_or(live_value);
                    (name, Interpolation::lerp(a, b, t))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::InterpolationMode;

    fn x(v: f64) -> ParameterSet {
        ParameterSet::new().with("x", v)
    }

    fn xy(a: f64, b: f64) -> ParameterSet {
        ParameterSet::new().with("x", a).with("y", b)
    }

    #[test]
    fn test_empty_store_passes_live_through() {
        let store = KeyframeStore::new(120);
        let live = xy(3.0, 4.0);
        assert_eq!(value_at(&store, 17.0, &live), live);
    }

    #[test]
    fn test_single_keyframe_holds() {
        let mut store = KeyframeStore::new(120);
        store.capture(50, x(42.0));
        let live = x(0.0);
        assert_eq!(value_at(&store, 0.0, &live).get("x"), Some(42.0));
        assert_eq!(value_at(&store, 119.0, &live).get("x"), Some(42.0));
    }

    #[test]
    fn test_boundaries_clamp_to_edge_keyframes() {
        let mut store = KeyframeStore::new(120);
        let (a, b, c) = (xy(0.0, 1.0), xy(10.0, 2.0), xy(20.0, 3.0));
        store.capture(0, a.clone());
        store.capture(60, b);
        store.capture(120, c.clone());
        let live = xy(-1.0, -1.0);

        assert_eq!(value_at(&store, 0.0, &live), a);
        assert_eq!(value_at(&store, 120.0, &live), c);
        assert_eq!(value_at(&store, -5.0, &live), a);
        assert_eq!(value_at(&store, 200.0, &live), c);
    }

    #[test]
    fn test_linear_midpoint() {
        let mut store = KeyframeStore::new(120);
        store.capture(0, x(0.0));
        store.capture(10, x(100.0));
        let live = x(-1.0);

        assert_eq!(value_at(&store, 5.0, &live).get("x"), Some(50.0));
        assert_eq!(value_at(&store, 0.0, &live).get("x"), Some(0.0));
        assert_eq!(value_at(&store, 10.0, &live).get("x"), Some(100.0));
        assert_eq!(value_at(&store, 2.5, &live).get("x"), Some(25.0));
    }

    #[test]
    fn test_missing_endpoint_value_uses_live() {
        let mut store = KeyframeStore::new(120);
        store.capture(0, xy(0.0, 0.0));
        store.capture(10, x(100.0));
        let live = xy(0.0, 50.0);

        let mid = value_at(&store, 5.0, &live);
        assert_eq!(mid.get("x"), Some(50.0));
        assert_eq!(mid.get("y"), Some(25.0));
    }

    #[test]
    fn test_output_follows_live_names() {
        let mut store = KeyframeStore::new(120);
        store.capture(0, xy(1.0, 2.0).with("stale", 9.0));
        let live = x(0.0);

        let out = value_at(&store, 0.0, &live);
        assert_eq!(out.len(), 1);
        assert!(!out.contains("stale"));
    }

    #[test]
    fn test_hold_mode_steps() {
        let mut store = KeyframeStore::new(120);
        store.capture(0, x(0.0));
        store.capture(10, x(100.0));
        store.set_interpolation(0, InterpolationMode::Hold).unwrap();
        let live = x(0.0);

        assert_eq!(value_at(&store, 9.9, &live).get("x"), Some(0.0));
        assert_eq!(value_at(&store, 10.0, &live).get("x"), Some(100.0));
    }

    #[test]
    fn test_bracket_picks_first_matching_pair() {
        let mut store = KeyframeStore::new(120);
        store.capture(0, x(0.0));
        store.capture(60, x(1.0));
        store.capture(120, x(2.0));

        match bracket(&store, 60.0) {
            Bracket::Between { prev, next } => {
                assert_eq!(prev.0, 60);
                assert_eq!(next.0, 120);
            }
            other => panic!("unexpected bracket {other:?}"),
        }
    }
}
