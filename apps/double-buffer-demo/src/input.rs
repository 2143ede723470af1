//! Per-tick input and timing snapshot, plus the scripted key source used
//! when running headless.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Everything a scene may read about the outside world during one tick.
#[derive(Debug, Clone, Default)]
pub struct FrameContext {
    pub tick: u64,
    /// Keys released this tick.
    pub key_up: BTreeSet<char>,
    /// Frames per second measured over the previous tick.
    pub framerate: f64,
}

impl FrameContext {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn with_key_up(mut self, key: char) -> Self {
        self.key_up.insert(key);
        self
    }

    pub fn key_up(&self, key: char) -> bool {
        self.key_up.contains(&key)
    }
}

/// Key-up events keyed by tick, written as `tick:key` pairs separated by
/// commas, e.g. `120:x,600:z,900:z`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyScript {
    events: BTreeMap<u64, BTreeSet<char>>,
}

impl KeyScript {
    pub fn press(&mut self, tick: u64, key: char) {
        self.events.entry(tick).or_default().insert(key);
    }

    pub fn keys_at(&self, tick: u64) -> BTreeSet<char> {
        self.events.get(&tick).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromStr for KeyScript {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut script = KeyScript::default();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (tick, key) = entry
                .split_once(':')
                .ok_or_else(|| format!("expected `tick:key`, got `{entry}`"))?;
            let tick: u64 = tick
                .trim()
                .parse()
                .map_err(|_| format!("invalid tick `{tick}` in `{entry}`"))?;
            let mut chars = key.trim().chars();
            let key = match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_ascii_lowercase(),
                _ => return Err(format!("expected a single key in `{entry}`")),
            };
            script.press(tick, key);
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script: KeyScript = "120:x, 600:Z,600:x".parse().unwrap();
        assert_eq!(script.keys_at(120), BTreeSet::from(['x']));
        assert_eq!(script.keys_at(600), BTreeSet::from(['x', 'z']));
        assert!(script.keys_at(5).is_empty());
    }

    #[test]
    fn test_parse_empty_script() {
        let script: KeyScript = "".parse().unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!("120".parse::<KeyScript>().is_err());
        assert!("abc:x".parse::<KeyScript>().is_err());
        assert!("10:xy".parse::<KeyScript>().is_err());
    }

    #[test]
    fn test_frame_context_keys() {
        let ctx = FrameContext::new(3).with_key_up('x');
        assert!(ctx.key_up('x'));
        assert!(!ctx.key_up('z'));
    }
}
