use serde_json::{json, Value};

/// Instructional prompt for resume parsing. Replace `{text}` before sending.
pub const PARSE_PROMPT: &str = "You are a resume parser. Extract structured information \
from the following resume text.\n\
Be thorough — extract all skills, work experience, and education entries.\n\
If a field is not found, leave it as null or empty list.\n\n\
Resume text:\n{text}";

/// Response schema constraining the model to the `ParsedResumeData` shape.
pub fn parsed_resume_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "full_name": {"type": "string", "nullable": true},
            "email": {"type": "string", "nullable": true},
            "phone": {"type": "string", "nullable": true},
            "summary": {"type": "string", "nullable": true},
            "skills": {"type": "array", "items": {"type": "string"}},
            "experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "company": {"type": "string"},
                        "title": {"type": "string"},
                        "start_date": {"type": "string", "nullable": true},
                        "end_date": {"type": "string", "nullable": true},
                        "description": {"type": "string", "nullable": true}
                    },
                    "required": ["company", "title"]
                }
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "institution": {"type": "string"},
                        "degree": {"type": "string", "nullable": true},
                        "field": {"type": "string", "nullable": true},
                        "year": {"type": "string", "nullable": true}
                    },
                    "required": ["institution"]
                }
            },
            "languages": {"type": "array", "items": {"type": "string"}},
            "certifications": {"type": "array", "items": {"type": "string"}}
        }
    })
}
