//! Order wizard as an explicit state machine.
//!
//! Steps run in a fixed order. Moving forward out of a step requires that
//! step's data; moving back is always allowed.

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};
use crate::resource::ImageHandle;

/// A wizard step.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    /// Upload a photo.
    #[default]
    ImageUpload,
    /// Pick a style prompt.
    PromptSelection,
    /// Pick a mug.
    MugSelection,
    /// Contact details.
    UserData,
    /// Generate and choose a stylized image.
    ImageGeneration,
    /// Final preview before adding to cart.
    Preview,
}

impl WizardStep {
    /// Steps in wizard order.
    pub const ALL: [Self; 6] = [
        Self::ImageUpload,
        Self::PromptSelection,
        Self::MugSelection,
        Self::UserData,
        Self::ImageGeneration,
        Self::Preview,
    ];

    /// Zero-based position in the wizard.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following step, if any.
    #[must_use]
    pub fn following(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The preceding step, if any.
    #[must_use]
    pub fn preceding(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ImageUpload => "image-upload",
            Self::PromptSelection => "prompt-selection",
            Self::MugSelection => "mug-selection",
            Self::UserData => "user-data",
            Self::ImageGeneration => "image-generation",
            Self::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// Customer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
}

impl ContactDetails {
    /// Name present and email plausibly shaped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let email = self.email.trim();
        !self.name.trim().is_empty()
            && email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
    }
}

/// Data collected across the wizard.
#[derive(Debug, Clone, Default)]
pub struct WizardData {
    /// Uploaded photo.
    pub image: Option<ImageHandle>,
    /// Chosen style prompt.
    pub prompt_id: Option<u64>,
    /// Chosen mug.
    pub mug_id: Option<u64>,
    /// Contact details.
    pub contact: ContactDetails,
    /// Paths or URLs returned by image generation.
    pub generated_images: Vec<String>,
    /// Index into `generated_images` of the chosen result.
    pub selected_image: Option<usize>,
}

impl WizardData {
    /// The chosen generated image, if any.
    #[must_use]
    pub fn selected_generated(&self) -> Option<&str> {
        self.selected_image
            .and_then(|i| self.generated_images.get(i))
            .map(String::as_str)
    }

    fn step_complete(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::ImageUpload => self.image.is_some(),
            WizardStep::PromptSelection => self.prompt_id.is_some(),
            WizardStep::MugSelection => self.mug_id.is_some(),
            WizardStep::UserData => self.contact.is_complete(),
            WizardStep::ImageGeneration => self.selected_generated().is_some(),
            WizardStep::Preview => true,
        }
    }
}

/// The order wizard.
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step: WizardStep,
    data: WizardData,
}

impl Wizard {
    /// Start at the first step with no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Collected data.
    #[must_use]
    pub fn data(&self) -> &WizardData {
        &self.data
    }

    /// Store the uploaded photo. Replacing it invalidates earlier generations.
    pub fn set_image(&mut self, image: ImageHandle) {
        self.data.image = Some(image);
        self.data.generated_images.clear();
        self.data.selected_image = None;
    }

    /// Store the chosen prompt.
    pub fn set_prompt(&mut self, prompt_id: u64) {
        self.data.prompt_id = Some(prompt_id);
    }

    /// Store the chosen mug.
    pub fn set_mug(&mut self, mug_id: u64) {
        self.data.mug_id = Some(mug_id);
    }

    /// Store contact details.
    pub fn set_contact(&mut self, contact: ContactDetails) {
        self.data.contact = contact;
    }

    /// Store generation results, clearing any previous choice.
    pub fn set_generated_images(&mut self, images: Vec<String>) {
        self.data.generated_images = images;
        self.data.selected_image = None;
    }

    /// Choose one of the generated images.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidOperation`] if `index` is out of range.
    pub fn select_generated(&mut self, index: usize) -> CanvasResult<()> {
        if index >= self.data.generated_images.len() {
            return Err(CanvasError::InvalidOperation(format!(
                "generated image {index} does not exist"
            )));
        }
        self.data.selected_image = Some(index);
        Ok(())
    }

    /// Whether the current step's data allows moving forward.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.step.following().is_some() && self.data.step_complete(self.step)
    }

    /// Advance one step.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::WizardTransition`] on the last step or when the
    /// current step is incomplete.
    pub fn next_step(&mut self) -> CanvasResult<WizardStep> {
        let Some(following) = self.step.following() else {
            return Err(CanvasError::WizardTransition(format!(
                "{} is the last step",
                self.step
            )));
        };
        if !self.data.step_complete(self.step) {
            return Err(CanvasError::WizardTransition(format!(
                "{} is incomplete",
                self.step
            )));
        }
        tracing::debug!(from = %self.step, to = %following, "wizard advanced");
        self.step = following;
        Ok(following)
    }

    /// Go back one step.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::WizardTransition`] on the first step.
    pub fn previous_step(&mut self) -> CanvasResult<WizardStep> {
        let preceding = self.step.preceding().ok_or_else(|| {
            CanvasError::WizardTransition(format!("{} is the first step", self.step))
        })?;
        tracing::debug!(from = %self.step, to = %preceding, "wizard went back");
        self.step = preceding;
        Ok(preceding)
    }

    /// Jump to `target`. Backward jumps always succeed; forward jumps need
    /// every step in between to be complete.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::WizardTransition`] naming the first incomplete
    /// step on the way.
    pub fn go_to(&mut self, target: WizardStep) -> CanvasResult<()> {
        if target > self.step {
            if let Some(blocking) = WizardStep::ALL[self.step.index()..target.index()]
                .iter()
                .find(|step| !self.data.step_complete(**step))
            {
                return Err(CanvasError::WizardTransition(format!(
                    "cannot reach {target}: {blocking} is incomplete"
                )));
            }
        }
        tracing::debug!(from = %self.step, to = %target, "wizard jumped");
        self.step = target;
        Ok(())
    }

    /// Drop all data and return to the first step.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::debug!("wizard reset");
    }
}
