use async_trait::async_trait;
use naobridge_core::Result;
use std::path::PathBuf;
use tracing::info;

/// What the robot can be asked to do
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RobotBackend: Send + Sync {
    async fn say(&self, text: &str) -> Result<()>;

    /// Play a clip by file name
    async fn play_audio(&self, file: &str) -> Result<()>;

    /// Perform gestures in order
    async fn gesture(&self, tokens: &[String]) -> Result<()>;
}

/// Backend for running without hardware: logs every action
pub struct SimulatedRobot {
    audio_dir: PathBuf,
}

impl SimulatedRobot {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
        }
    }

    /// Where a clip lives on the robot
    pub fn audio_path(&self, file: &str) -> PathBuf {
        self.audio_dir.join(file)
    }
}

#[async_trait]
impl RobotBackend for SimulatedRobot {
    async fn say(&self, text: &str) -> Result<()> {
        info!(%text, "Robot says");
        Ok(())
    }

    async fn play_audio(&self, file: &str) -> Result<()> {
        info!(path = %self.audio_path(file).display(), "Robot plays audio");
        Ok(())
    }

    async fn gesture(&self, tokens: &[String]) -> Result<()> {
        for token in tokens {
            info!(gesture = %token, "Robot performs gesture");
        }
        Ok(())
    }
}
