/// Core functionality modules
///
/// Host logic around the decision components: crop reference data,
/// fertilizer advice, disease reports and the chat assistant.

pub mod chat_assistant;
pub mod crop_reference;
pub mod disease_advisor;
pub mod fertilizer_advisor;

pub use chat_assistant::{ChatAssistant, ChatOptions, ChatReply, ReplyStatus};
pub use crop_reference::{CropNutrients, CropReference};
pub use disease_advisor::{Diagnosis, DiseaseAdvisor, DiseaseReport, PlantLabel};
pub use fertilizer_advisor::{FertilizerAdvice, FertilizerAdvisor};
