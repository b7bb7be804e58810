//! Collaborators the lead service consumes but does not own: staff session
//! handling and resume object storage.

pub mod object_storage;
pub mod session;

pub use object_storage::{
    HttpObjectStorage, MemoryObjectStorage, ObjectStorage, StoredObject, UploadRequest,
};
pub use session::{JwtSessionProvider, SessionConfig, SessionError, SessionProvider, StaffSession};
