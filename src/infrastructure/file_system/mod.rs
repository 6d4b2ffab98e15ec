pub mod local_resume_storage;

pub use local_resume_storage::LocalResumeStorage;
