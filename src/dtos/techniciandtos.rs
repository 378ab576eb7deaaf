use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dtos::userdtos::FilterUserDto;
use crate::models::technicianmodel::{
    TechnicianAvailability, TechnicianSkill, VerificationDocument,
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct AddSkillDto {
    #[validate(length(min = 2, max = 100, message = "Skill name must be between 2-100 characters"))]
    pub skill_name: String,

    #[validate(range(min = 0, max = 60, message = "Years of experience must be between 0 and 60"))]
    pub years_experience: i32,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct AddAvailabilityDto {
    /// 0 (Monday) through 6 (Sunday).
    #[validate(range(min = 0, max = 6, message = "Day must be between 0 and 6"))]
    pub day_of_week: i16,

    #[validate(range(min = 0, max = 1439, message = "Start must be a minute of the day"))]
    pub start_minute: i32,

    #[validate(range(min = 1, max = 1440, message = "End must be a minute of the day"))]
    pub end_minute: i32,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SubmitDocumentDto {
    #[validate(length(min = 2, max = 100, message = "Document type must be between 2-100 characters"))]
    pub document_type: String,

    #[validate(url(message = "Document must be a valid URL"))]
    pub document_url: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDocumentDto {
    /// "approved" or "rejected".
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillResponseDto {
    pub status: String,
    pub skill: TechnicianSkill,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillListResponseDto {
    pub status: String,
    pub skills: Vec<TechnicianSkill>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponseDto {
    pub status: String,
    pub slot: TechnicianAvailability,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityListResponseDto {
    pub status: String,
    pub slots: Vec<TechnicianAvailability>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponseDto {
    pub status: String,
    pub document: VerificationDocument,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentListResponseDto {
    pub status: String,
    pub documents: Vec<VerificationDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TechnicianListResponseDto {
    pub status: String,
    pub technicians: Vec<FilterUserDto>,
    pub results: usize,
}
