//! Resolução do usuário corrente
//!
//! Liga a sessão do provedor de identidade ao perfil armazenado no banco.
//! O contrato é de ausência, não de erro: sem sessão, provedor indisponível e
//! sessão sem perfil provisionado resultam todos em `None` (os dois últimos
//! com aviso no log). Chamadores tratam `None` como "sem acesso às visões
//! protegidas por papel".

use sqlx::SqlitePool;
use tracing::warn;

use petcuidado_db::{ScopedAccess, UserProfile};

use crate::session::IdentityService;

/// Resolve o perfil do usuário da sessão ativa
pub async fn resolve_current_user(
    identity: &dyn IdentityService,
    pool: &SqlitePool,
) -> Option<UserProfile> {
    let sessao = match identity.get_session_user().await {
        Ok(Some(sessao)) => sessao,
        Ok(None) => return None,
        Err(erro) => {
            warn!(%erro, "falha ao consultar a sessão ativa");
            return None;
        }
    };

    let busca = sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles WHERE id = ?")
        .bind(sessao.id)
        .fetch_optional(pool)
        .await;

    match busca {
        Ok(Some(perfil)) => Some(perfil),
        Ok(None) => {
            warn!(usuario = %sessao.id, "sessão ativa sem perfil provisionado");
            None
        }
        Err(erro) => {
            warn!(%erro, "falha ao carregar o perfil da sessão");
            None
        }
    }
}

/// Resolve o usuário corrente e devolve a capacidade de acesso com o escopo
/// do papel dele
pub async fn scoped_access(
    identity: &dyn IdentityService,
    pool: &SqlitePool,
) -> Option<ScopedAccess> {
    let perfil = resolve_current_user(identity, pool).await?;
    Some(ScopedAccess::new(pool.clone(), perfil))
}
