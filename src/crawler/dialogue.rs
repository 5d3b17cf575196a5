//! Narration for floor entries and battle intros.
//!
//! A [`Narrator`] owns an optional external [`DialogueSource`], a per-key
//! cache and a rate-limit cooldown. Whenever the source is missing, slow,
//! rate limited or broken, the local generator fills in, so the player
//! always gets a line.

use std::collections::HashMap;

use rand::Rng;
use serde::Deserialize;

use super::config::CrawlerConfig;
use super::state::{job_info, Job};
use crate::time::{Clock, Cooldown};

pub const GUIDE_SPEAKER: &str = "時の案内人";

const THEMES: [&str; 6] = [
    "静寂が支配する",
    "微かな光が差し込む",
    "風の音が遠くで響く",
    "湿った土の香りがする",
    "懐かしい歌が聞こえるような",
    "時間が止まったような",
];

const EVENTS: [&str; 5] = [
    "ここはかつて誰かの居場所だったのかもしれません。",
    "壁の落書きは、遠い昔の冒険者のもののようです。",
    "あなたの足音が、この世界の鼓動のように響きます。",
    "どこからか、甘い花の香りが漂ってきました。",
    "暗闇の向こうで、何かが瞬いた気がします。",
];

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Dialogue {
    pub speaker: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogueRequest {
    FloorEntry { floor: u32, job: Job },
    BattleIntro { enemy: String },
}

impl DialogueRequest {
    pub fn cache_key(&self) -> String {
        match self {
            DialogueRequest::FloorEntry { floor, job } => {
                format!("floor-{}-{}", floor, job_info(*job).name)
            }
            DialogueRequest::BattleIntro { enemy } => format!("enemy-{}", enemy),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogueError {
    #[error("dialogue source unavailable: {0}")]
    Unavailable(String),

    #[error("dialogue source is rate limited")]
    RateLimited,

    #[error("dialogue source exceeded its {budget_ms}ms budget")]
    TimedOut { budget_ms: f64 },

    #[error("malformed dialogue: {0}")]
    Malformed(String),
}

/// External text provider. Calls are synchronous and should respect
/// `budget_ms`; late answers are discarded anyway.
pub trait DialogueSource {
    fn fetch(&mut self, request: &DialogueRequest, budget_ms: f64) -> Result<Dialogue, DialogueError>;
}

/// Lines supplied by the hosting page, keyed like the narrator cache
/// (`floor-3-戦士`, `enemy-スライム`). Unlisted keys are unavailable.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct PageLines {
    lines: HashMap<String, Dialogue>,
}

impl PageLines {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl DialogueSource for PageLines {
    fn fetch(&mut self, request: &DialogueRequest, _budget_ms: f64) -> Result<Dialogue, DialogueError> {
        let key = request.cache_key();
        match self.lines.get(&key) {
            Some(line) => Ok(line.clone()),
            None => Err(DialogueError::Unavailable(key)),
        }
    }
}

/// Where a line came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sourced<T> {
    Fresh(T),
    Fallback(T),
}

impl<T> Sourced<T> {
    pub fn value(&self) -> &T {
        match self {
            Sourced::Fresh(v) | Sourced::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Sourced::Fresh(v) | Sourced::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback(_))
    }
}

// ── Local generator ───────────────────────────────────────────

pub struct LocalNarrator;

impl LocalNarrator {
    pub fn compose<R: Rng + ?Sized>(request: &DialogueRequest, rng: &mut R) -> Dialogue {
        match request {
            DialogueRequest::FloorEntry { floor, .. } => Dialogue {
                speaker: GUIDE_SPEAKER.to_string(),
                message: Self::floor_entry(*floor, rng),
            },
            DialogueRequest::BattleIntro { enemy } => Dialogue {
                speaker: enemy.clone(),
                message: Self::battle_intro(enemy, rng),
            },
        }
    }

    pub fn floor_entry<R: Rng + ?Sized>(floor: u32, rng: &mut R) -> String {
        let theme = THEMES[floor as usize % THEMES.len()];
        let event = EVENTS[rng.gen_range(0..EVENTS.len())];
        format!("{}階...。{}{}", floor, theme, event)
    }

    pub fn battle_intro<R: Rng + ?Sized>(enemy: &str, rng: &mut R) -> String {
        match rng.gen_range(0..5) {
            0 => format!("{}が、こちらをじっと見つめています。", enemy),
            1 => format!("影の中から{}が姿を現しました。", enemy),
            2 => format!("{}が、不思議な踊りを踊りながら近づいてきます。", enemy),
            3 => format!("ふわふわとした{}が行く手を塞いでいます。", enemy),
            _ => format!("{}との静かな対峙が始まります。", enemy),
        }
    }
}

// ── Narrator ──────────────────────────────────────────────────

pub struct Narrator {
    source: Option<Box<dyn DialogueSource>>,
    clock: Box<dyn Clock>,
    cache: HashMap<String, Sourced<Dialogue>>,
    cooldown: Cooldown,
    budget_ms: f64,
}

impl Narrator {
    pub fn new(clock: Box<dyn Clock>, config: &CrawlerConfig) -> Self {
        Self {
            source: None,
            clock,
            cache: HashMap::new(),
            cooldown: Cooldown::new(config.dialogue_cooldown_ms),
            budget_ms: config.dialogue_budget_ms,
        }
    }

    pub fn with_source(mut self, source: Box<dyn DialogueSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown.is_active(self.clock.now_ms())
    }

    pub fn narrate<R: Rng + ?Sized>(&mut self, request: &DialogueRequest, rng: &mut R) -> Sourced<Dialogue> {
        let key = request.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let line = match self.ask_source(request) {
            Ok(dialogue) => Sourced::Fresh(dialogue),
            Err(err) => {
                match err {
                    Some(DialogueError::Unavailable(reason)) => {
                        tracing::debug!(%reason, "no line from dialogue source")
                    }
                    Some(err) => tracing::warn!(%err, key = %key, "dialogue fell back to local text"),
                    None => {}
                }
                Sourced::Fallback(LocalNarrator::compose(request, rng))
            }
        };
        tracing::debug!(key = %key, fallback = line.is_fallback(), speaker = %line.value().speaker, "narrated");
        self.cache.insert(key, line.clone());
        line
    }

    /// `Err(None)` means the source was skipped rather than failed.
    fn ask_source(&mut self, request: &DialogueRequest) -> Result<Dialogue, Option<DialogueError>> {
        if self.is_cooling_down() {
            let remaining_ms = self.cooldown.remaining_ms(self.clock.now_ms());
            tracing::debug!(remaining_ms, "dialogue source cooling down");
            return Err(None);
        }
        let started = self.clock.now_ms();
        let Some(source) = self.source.as_mut() else {
            return Err(None);
        };

        let result = source.fetch(request, self.budget_ms);
        let elapsed = self.clock.now_ms() - started;
        match result {
            Ok(_) if elapsed > self.budget_ms => Err(Some(DialogueError::TimedOut { budget_ms: self.budget_ms })),
            Ok(dialogue) if dialogue.message.trim().is_empty() => {
                Err(Some(DialogueError::Malformed("empty message".to_string())))
            }
            Ok(dialogue) => Ok(dialogue),
            Err(DialogueError::RateLimited) => {
                self.cooldown.trip(self.clock.now_ms());
                Err(Some(DialogueError::RateLimited))
            }
            Err(err) => Err(Some(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Replays a fixed outcome, counting calls and optionally taking time.
    struct ScriptedSource {
        outcome: Result<Dialogue, DialogueError>,
        calls: Rc<Cell<u32>>,
        clock: ManualClock,
        takes_ms: f64,
    }

    impl DialogueSource for ScriptedSource {
        fn fetch(&mut self, _request: &DialogueRequest, _budget_ms: f64) -> Result<Dialogue, DialogueError> {
            self.calls.set(self.calls.get() + 1);
            self.clock.advance(self.takes_ms);
            self.outcome.clone()
        }
    }

    fn line(message: &str) -> Dialogue {
        Dialogue { speaker: "案内人".to_string(), message: message.to_string() }
    }

    fn narrator_with(outcome: Result<Dialogue, DialogueError>, takes_ms: f64) -> (Narrator, ManualClock, Rc<Cell<u32>>) {
        let clock = ManualClock::new();
        let calls = Rc::new(Cell::new(0));
        let source = ScriptedSource { outcome, calls: calls.clone(), clock: clock.clone(), takes_ms };
        let narrator = Narrator::new(Box::new(clock.clone()), &CrawlerConfig::default()).with_source(Box::new(source));
        (narrator, clock, calls)
    }

    fn floor(n: u32) -> DialogueRequest {
        DialogueRequest::FloorEntry { floor: n, job: Job::Warrior }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn cache_keys() {
        assert_eq!(floor(3).cache_key(), "floor-3-戦士");
        let req = DialogueRequest::FloorEntry { floor: 1, job: Job::Mage };
        assert_eq!(req.cache_key(), "floor-1-魔導士");
        let req = DialogueRequest::BattleIntro { enemy: "スライム".to_string() };
        assert_eq!(req.cache_key(), "enemy-スライム");
    }

    #[test]
    fn local_floor_line_shape() {
        let mut rng = rng();
        for n in 1..=12u32 {
            let text = LocalNarrator::floor_entry(n, &mut rng);
            let prefix = format!("{}階...。{}", n, THEMES[n as usize % 6]);
            assert!(text.starts_with(&prefix), "{}", text);
            assert!(EVENTS.iter().any(|e| text.ends_with(e)), "{}", text);
        }
    }

    #[test]
    fn local_battle_intro_names_enemy() {
        let mut rng = rng();
        for _ in 0..20 {
            let text = LocalNarrator::battle_intro("ゴブリン", &mut rng);
            assert!(text.contains("ゴブリン"));
        }
        let d = LocalNarrator::compose(&DialogueRequest::BattleIntro { enemy: "コウモリ".into() }, &mut rng);
        assert_eq!(d.speaker, "コウモリ");
    }

    #[test]
    fn no_source_falls_back() {
        let mut narrator = Narrator::new(Box::new(ManualClock::new()), &CrawlerConfig::default());
        let out = narrator.narrate(&floor(2), &mut rng());
        assert!(out.is_fallback());
        assert_eq!(out.value().speaker, GUIDE_SPEAKER);
        assert!(out.value().message.starts_with("2階...。"));
    }

    #[test]
    fn fresh_line_is_cached() {
        let (mut narrator, _clock, calls) = narrator_with(Ok(line("ようこそ")), 10.0);
        let first = narrator.narrate(&floor(1), &mut rng());
        let second = narrator.narrate(&floor(1), &mut rng());
        assert_eq!(first, Sourced::Fresh(line("ようこそ")));
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        narrator.narrate(&floor(2), &mut rng());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn fallback_is_cached_too() {
        let (mut narrator, _clock, calls) =
            narrator_with(Err(DialogueError::Unavailable("offline".into())), 0.0);
        let first = narrator.narrate(&floor(4), &mut rng());
        assert!(first.is_fallback());
        let second = narrator.narrate(&floor(4), &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn rate_limit_trips_cooldown() {
        let (mut narrator, clock, calls) = narrator_with(Err(DialogueError::RateLimited), 0.0);
        assert!(narrator.narrate(&floor(1), &mut rng()).is_fallback());
        assert!(narrator.is_cooling_down());
        assert_eq!(calls.get(), 1);

        // Skipped entirely while cooling down.
        narrator.narrate(&floor(2), &mut rng());
        assert_eq!(calls.get(), 1);

        clock.advance(90_000.0);
        assert!(!narrator.is_cooling_down());
        narrator.narrate(&floor(3), &mut rng());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn late_answer_is_discarded() {
        let (mut narrator, _clock, _calls) = narrator_with(Ok(line("遅すぎた")), 2_000.0);
        let out = narrator.narrate(&floor(1), &mut rng());
        assert!(out.is_fallback());
        assert_ne!(out.value().message, "遅すぎた");
    }

    #[test]
    fn empty_answer_is_malformed() {
        let (mut narrator, _clock, _calls) = narrator_with(Ok(line("  ")), 0.0);
        let out = narrator.narrate(&DialogueRequest::BattleIntro { enemy: "ガイコツ".into() }, &mut rng());
        assert!(out.is_fallback());
        assert!(out.value().message.contains("ガイコツ"));
        assert!(!narrator.is_cooling_down());
    }

    #[test]
    fn page_lines_serve_listed_keys_only() {
        let json = r#"{"floor-1-戦士": {"speaker": "門番", "message": "気をつけて。"}}"#;
        let lines = PageLines::from_json(json).unwrap();
        let mut narrator =
            Narrator::new(Box::new(ManualClock::new()), &CrawlerConfig::default()).with_source(Box::new(lines));

        let hit = narrator.narrate(&floor(1), &mut rng());
        assert_eq!(
            hit,
            Sourced::Fresh(Dialogue { speaker: "門番".into(), message: "気をつけて。".into() })
        );
        let miss = narrator.narrate(&floor(2), &mut rng());
        assert!(miss.is_fallback());
        assert!(!narrator.is_cooling_down());
    }

    #[test]
    fn page_lines_report_missing_key() {
        let mut lines = PageLines::default();
        let err = lines.fetch(&floor(5), 100.0).unwrap_err();
        assert_eq!(err, DialogueError::Unavailable("floor-5-戦士".into()));
    }

    #[test]
    fn page_lines_reject_bad_json() {
        assert!(PageLines::from_json("[1, 2]").is_err());
        assert!(PageLines::from_json(r#"{"enemy-スライム": {"speaker": "x"}}"#).is_err());
        assert!(PageLines::from_json("{}").is_ok());
    }

    #[test]
    fn sourced_accessors() {
        let s = Sourced::Fallback(5);
        assert!(s.is_fallback());
        assert_eq!(*s.value(), 5);
        assert_eq!(s.into_inner(), 5);
        assert!(!Sourced::Fresh(1).is_fallback());
    }
}
