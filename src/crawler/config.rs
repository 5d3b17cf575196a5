//! ゲーム設定。
//!
//! ページ内の `<script id="crawler-config" type="application/json">` から
//! 読み込む。全フィールド省略可能で、省略時は既定値を使う。

use serde::{Deserialize, Serialize};

use super::dungeon_map::MIN_DIMENSION;
use super::projector::CameraParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// フロアの幅と高さ。奇数の方が迷路が綺麗に埋まる。
    pub floor_width: usize,
    pub floor_height: usize,
    /// この階の階段を踏むとダンジョン制覇。
    pub max_floors: u32,
    /// 1歩ごとのエンカウント率 (%)。
    pub encounter_percent: u32,
    pub fov_scale: f64,
    /// 3D ビューで描く奥行きスライス数。
    pub max_depth: u32,
    /// 会話ソース 1 リクエストの持ち時間 (ms)。
    pub dialogue_budget_ms: f64,
    /// レート制限を受けた後、ローカル生成に切り替える時間 (ms)。
    pub dialogue_cooldown_ms: f64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            floor_width: 13,
            floor_height: 13,
            max_floors: 10,
            encounter_percent: 15,
            fov_scale: 0.8,
            max_depth: 6,
            dialogue_budget_ms: 1500.0,
            dialogue_cooldown_ms: 90_000.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("floor {width}x{height} is below the {min}x{min} minimum")]
    FloorTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },

    #[error("camera needs fov_scale > 0 and max_depth >= 1 (got {fov_scale}, {max_depth})")]
    InvalidCamera { fov_scale: f64, max_depth: u32 },

    #[error("encounter_percent must be 0..=100 (got {0})")]
    InvalidEncounterRate(u32),
}

impl CrawlerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: CrawlerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floor_width < MIN_DIMENSION || self.floor_height < MIN_DIMENSION {
            return Err(ConfigError::FloorTooSmall {
                width: self.floor_width,
                height: self.floor_height,
                min: MIN_DIMENSION,
            });
        }
        if self.fov_scale.is_nan() || self.fov_scale <= 0.0 || self.max_depth == 0 {
            return Err(ConfigError::InvalidCamera {
                fov_scale: self.fov_scale,
                max_depth: self.max_depth,
            });
        }
        if self.encounter_percent > 100 {
            return Err(ConfigError::InvalidEncounterRate(self.encounter_percent));
        }
        Ok(())
    }

    /// 指定ラスタサイズのカメラ。
    pub fn camera(&self, width: u32, height: u32) -> CameraParams {
        CameraParams {
            fov_scale: self.fov_scale,
            max_depth: self.max_depth,
            width,
            height,
        }
    }
}
