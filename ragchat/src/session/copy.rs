//! User-facing text the session writes into the transcript and notices.

pub const GREETING: &str = "Hello! I'm your RAG chatbot assistant. You can ask me questions \
    about your uploaded documents or upload new documents for me to analyze.";

pub const EMPTY_REPLY: &str = "Sorry, I couldn't process your request.";

pub const CHAT_TIMEOUT: &str = "Request timed out. Please try again with a shorter message.";
pub const CHAT_FAILED: &str = "Sorry, I encountered an error. Please try again.";
pub const CHAT_TIMEOUT_NOTICE: &str = "Request timed out";
pub const CHAT_FAILED_NOTICE: &str = "Failed to send message";

pub const UPLOAD_TIMEOUT: &str = "File upload timed out. Please try again with a smaller file.";
pub const UPLOAD_FAILED: &str = "Sorry, I couldn't upload your file. Please try again.";
pub const UPLOAD_TIMEOUT_NOTICE: &str = "Upload timed out";
pub const UPLOAD_FAILED_NOTICE: &str = "Failed to upload file";
pub const UPLOAD_SUCCESS_NOTICE: &str = "File uploaded and processed successfully";
