//! API request/response models and GitHub API payload types.

pub mod commit;
pub mod repository;
pub mod user;

pub use commit::{
    ArticleResponse, CommitResponse, DocType, GenerateArticleRequest, GitHubCommitItem, NewCommit,
    UpdateArticleRequest,
};
pub use repository::{GitHubRepo, NewRepository, RepositoryResponse};
pub use user::{GitHubUserInfo, SessionClaims, UserResponse};
