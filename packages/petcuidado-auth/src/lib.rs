//! PetCuidado Auth - Contrato de identidade e resolução de perfil
//!
//! Esta biblioteca fornece:
//! - O contrato do serviço de identidade externo ([`IdentityService`])
//! - A resolução da sessão ativa para o perfil armazenado
//! - A construção da capacidade de acesso com escopo por papel
//! - Stubs em memória para testes (feature `test-utils`)

pub mod error;
pub mod resolver;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod stubs;

pub use error::AuthError;
pub use resolver::{resolve_current_user, scoped_access};
pub use session::{IdentityService, SessionUser, SignUpMetadata};
