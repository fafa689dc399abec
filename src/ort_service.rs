use crate::{
    config::ModelConfig,
    model_service::{ModelService, ModelServiceError},
};
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, MutexGuard,
};

/// Fixed set of slots handed out round-robin, one caller per slot at a time.
struct SessionPool<T> {
    slots: Vec<Mutex<T>>,
    counter: AtomicUsize,
}

impl<T> SessionPool<T> {
    fn new(slots: Vec<T>) -> Self {
        assert!(!slots.is_empty(), "session pool needs at least one slot");
        Self {
            slots: slots.into_iter().map(Mutex::new).collect(),
            counter: AtomicUsize::new(0),
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    /// A panic during a run poisons the slot's mutex. A session keeps no
    /// state between runs, so the slot is cleared and handed out again.
    fn acquire(&self) -> (usize, MutexGuard<'_, T>) {
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let slot = &self.slots[index];
        let guard = slot.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Session {} was poisoned by a panicked run, reusing it", index);
            slot.clear_poison();
            poisoned.into_inner()
        });
        (index, guard)
    }
}

pub struct OrtModelService {
    sessions: SessionPool<Session>,
    output_name: String,
}

impl OrtModelService {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ModelServiceError> {
        ort::init().with_name("cat_dog_classifier").commit()?;

        let num_instances = model_config.num_instances.max(1);
        let sessions = (0..num_instances)
            .map(|_| {
                Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .with_intra_threads(1)?
                    .commit_from_file(model_config.get_path())
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        let output_name = sessions[0]
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or(ModelServiceError::EmptyOutput)?;

        tracing::info!(
            "Created {} ONNX sessions from {:?}, reading output `{}`",
            num_instances,
            model_config.get_path(),
            output_name
        );

        Ok(Self {
            sessions: SessionPool::new(sessions),
            output_name,
        })
    }
}

impl ModelService for OrtModelService {
    fn score(&self, input: &Array<f32, Ix4>) -> Result<f32, ModelServiceError> {
        let (index, mut session) = self.sessions.acquire();
        tracing::debug!(
            "Handling request with session {}/{}",
            index,
            self.sessions.len()
        );

        let owned_buffer;
        let input_view = if input.view().is_standard_layout() {
            input.view()
        } else {
            owned_buffer = input.as_standard_layout().to_owned();
            owned_buffer.view()
        };

        let tensor_ref = TensorRef::from_array_view(input_view)?;
        let outputs = session.run(ort::inputs![tensor_ref])?;

        let (_, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        let score = data.first().copied().ok_or(ModelServiceError::EmptyOutput)?;

        if !score.is_finite() {
            return Err(ModelServiceError::NonFiniteScore(score));
        }

        Ok(score)
    }
}
