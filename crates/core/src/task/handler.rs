//! Task handlers: the bridge from a typed task to a pipeline.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::types::{Task, TaskResult, TaskType};
use crate::encoder::{Encoder, ImageEncoder, ImageProber, Prober};
use crate::pipeline::{ImagePipeline, ImageTarget, VideoPipeline};

/// Processes one task to a terminal result.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: &Task, cancel: &CancellationToken) -> TaskResult;
}

/// Handler lookup used by the executor.
pub type HandlerRegistry = HashMap<TaskType, Arc<dyn TaskHandler>>;

/// Runs video-sticker tasks through a [`VideoPipeline`].
pub struct VideoStickerHandler<P: Prober, E: Encoder> {
    pipeline: VideoPipeline<P, E>,
}

impl<P: Prober, E: Encoder> VideoStickerHandler<P, E> {
    pub fn new(pipeline: VideoPipeline<P, E>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl<P: Prober, E: Encoder> TaskHandler for VideoStickerHandler<P, E> {
    async fn handle(&self, task: &Task, cancel: &CancellationToken) -> TaskResult {
        self.pipeline.run_job(&task.job, cancel).await
    }
}

/// Runs static-sticker or emoji tasks through an [`ImagePipeline`].
pub struct ImageStickerHandler<E: ImageEncoder, P: ImageProber> {
    pipeline: ImagePipeline<E, P>,
}

impl<E: ImageEncoder, P: ImageProber> ImageStickerHandler<E, P> {
    pub fn new(pipeline: ImagePipeline<E, P>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl<E: ImageEncoder, P: ImageProber> TaskHandler for ImageStickerHandler<E, P> {
    async fn handle(&self, task: &Task, cancel: &CancellationToken) -> TaskResult {
        self.pipeline.run_job(&task.job, cancel).await
    }
}

/// Registers a handler for every task type, sharing one set of services.
pub fn default_handlers<M, I>(media: Arc<M>, image_prober: Arc<I>) -> HandlerRegistry
where
    M: Prober + Encoder + ImageEncoder + 'static,
    I: ImageProber + 'static,
{
    let mut handlers: HandlerRegistry = HashMap::new();

    let video = VideoPipeline::new(Arc::clone(&media), Arc::clone(&media));
    handlers.insert(
        TaskType::VideoSticker,
        Arc::new(VideoStickerHandler::new(video)),
    );

    for target in [ImageTarget::StaticSticker, ImageTarget::Emoji] {
        let pipeline = ImagePipeline::new(Arc::clone(&media), Arc::clone(&image_prober), target);
        handlers.insert(
            target.task_type(),
            Arc::new(ImageStickerHandler::new(pipeline)),
        );
    }

    handlers
}
