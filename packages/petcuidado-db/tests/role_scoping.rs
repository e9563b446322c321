//! Testes de integração da camada de consultas e da capacidade com escopo

mod common;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use common::{insere_perfil, nova_consulta, novo_pet, pool_de_teste};
use petcuidado_db::{
    queries, AtualizaPet, DbError, Especie, NovaPrescricao, NovaVacina, ScopedAccess, UserProfile,
};

async fn carrega_perfil(pool: &SqlitePool, id: Uuid) -> UserProfile {
    sqlx::query_as::<_, UserProfile>("SELECT * FROM profiles WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("perfil existente")
}

fn nova_prescricao(consulta_id: Uuid, pet_id: Uuid, veterinario_id: Uuid) -> NovaPrescricao {
    NovaPrescricao {
        consulta_id,
        pet_id,
        veterinario_id,
        medicamento: "Amoxicilina".to_string(),
        dosagem: "250mg".to_string(),
        frequencia: "8/8h".to_string(),
        duracao: "7 dias".to_string(),
        instrucoes: None,
        data_inicio: Utc::now().date_naive(),
        data_fim: None,
        status: Default::default(),
    }
}

#[tokio::test]
async fn pets_escopados_por_tutor() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let tutor2 = insere_perfil(&pool, "tutor", "Bruno").await;

    let p1 = queries::create_pet(&pool, &novo_pet(tutora, "Rex"))
        .await
        .expect("cadastra P1");
    let p2 = queries::create_pet(&pool, &novo_pet(tutor2, "Mimi"))
        .await
        .expect("cadastra P2");

    // Visão do tutor: apenas os próprios pets
    let da_tutora = queries::list_pets(&pool, Some(tutora)).await.expect("lista");
    assert_eq!(da_tutora.len(), 1);
    assert_eq!(da_tutora[0].id, p1.id);

    // Visão sem escopo (admin): todos os pets
    let todos = queries::list_pets(&pool, None).await.expect("lista");
    let ids: Vec<Uuid> = todos.iter().map(|pet| pet.id).collect();
    assert_eq!(todos.len(), 2);
    assert!(ids.contains(&p1.id));
    assert!(ids.contains(&p2.id));
}

#[tokio::test]
async fn consultas_por_participante_sao_uniao_sem_duplicatas() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let tutor2 = insere_perfil(&pool, "tutor", "Bruno").await;
    let vet = insere_perfil(&pool, "veterinario", "Dra. Carla").await;
    let vet2 = insere_perfil(&pool, "veterinario", "Dr. Davi").await;

    let p1 = queries::create_pet(&pool, &novo_pet(tutora, "Rex"))
        .await
        .expect("pet");
    let p2 = queries::create_pet(&pool, &novo_pet(tutor2, "Mimi"))
        .await
        .expect("pet");

    let agora = Utc::now();
    let como_tutora = queries::create_consulta(&pool, &nova_consulta(p1.id, vet2, tutora, agora))
        .await
        .expect("consulta");
    let como_vet = queries::create_consulta(&pool, &nova_consulta(p2.id, vet, tutor2, agora))
        .await
        .expect("consulta");
    let alheia = queries::create_consulta(&pool, &nova_consulta(p2.id, vet2, tutor2, agora))
        .await
        .expect("consulta");
    // A mesma pessoa como tutora e veterinária da consulta: o predicado OU
    // casa a linha uma única vez
    let dupla = queries::create_consulta(&pool, &nova_consulta(p2.id, vet, vet, agora))
        .await
        .expect("consulta");

    // União: linhas onde o usuário é tutor OU veterinário
    let da_vet = queries::list_consultas(&pool, None, Some(vet))
        .await
        .expect("lista");
    let ids_da_vet: Vec<Uuid> = da_vet.iter().map(|consulta| consulta.consulta.id).collect();
    assert_eq!(da_vet.len(), 2);
    assert!(ids_da_vet.contains(&como_vet.id));
    assert!(ids_da_vet.contains(&dupla.id));

    let da_tutora = queries::list_consultas(&pool, None, Some(tutora))
        .await
        .expect("lista");
    assert_eq!(da_tutora.len(), 1);
    assert_eq!(da_tutora[0].consulta.id, como_tutora.id);

    // Sem escopo: todas, com relações resolvidas
    let todas = queries::list_consultas(&pool, None, None).await.expect("lista");
    assert_eq!(todas.len(), 4);
    let detalhe = todas
        .iter()
        .find(|consulta| consulta.consulta.id == alheia.id)
        .expect("consulta presente");
    assert_eq!(detalhe.pet.id, p2.id);
    assert_eq!(detalhe.veterinario.id, vet2);
    assert_eq!(detalhe.tutor.id, tutor2);

    // Filtro por pet compõe com o participante
    let da_tutora_p2 = queries::list_consultas(&pool, Some(p2.id), Some(tutora))
        .await
        .expect("lista");
    assert!(da_tutora_p2.is_empty());
}

#[tokio::test]
async fn cadastro_e_busca_ida_e_volta() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;

    let mut payload = novo_pet(tutora, "Thor");
    payload.species = Especie::Gato;
    payload.breed = Some("Siamês".to_string());
    payload.weight = Some(4.2);
    payload.notes = Some("Alérgico a dipirona".to_string());

    let criado = queries::create_pet(&pool, &payload).await.expect("cadastra");
    let buscado = queries::get_pet_by_id(&pool, criado.id).await.expect("busca");

    assert_eq!(buscado.user_id, tutora);
    assert_eq!(buscado.name, "Thor");
    assert_eq!(buscado.species, Especie::Gato);
    assert_eq!(buscado.breed.as_deref(), Some("Siamês"));
    assert_eq!(buscado.weight, Some(4.2));
    assert_eq!(buscado.notes.as_deref(), Some("Alérgico a dipirona"));
    assert_eq!(buscado.id, criado.id);
    assert_eq!(buscado.created_at, criado.created_at);
}

#[tokio::test]
async fn busca_de_pet_inexistente_e_not_found() {
    let (_dir, pool) = pool_de_teste().await;
    let resultado = queries::get_pet_by_id(&pool, Uuid::new_v4()).await;
    assert!(matches!(resultado, Err(DbError::NotFound(_))));
}

#[tokio::test]
async fn atualizacao_parcial_preserva_os_demais_campos() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;

    let mut payload = novo_pet(tutora, "Rex");
    payload.breed = Some("Vira-lata".to_string());
    payload.weight = Some(18.0);
    let criado = queries::create_pet(&pool, &payload).await.expect("cadastra");

    let atualizado = queries::update_pet(
        &pool,
        criado.id,
        &AtualizaPet {
            weight: Some(19.5),
            ..Default::default()
        },
    )
    .await
    .expect("atualiza");

    assert_eq!(atualizado.weight, Some(19.5));
    assert_eq!(atualizado.name, "Rex");
    assert_eq!(atualizado.breed.as_deref(), Some("Vira-lata"));
    assert!(atualizado.updated_at >= criado.updated_at);

    let inexistente = queries::update_pet(&pool, Uuid::new_v4(), &AtualizaPet::default()).await;
    assert!(matches!(inexistente, Err(DbError::NotFound(_))));
}

#[tokio::test]
async fn exclusao_bloqueada_por_historico_clinico() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let vet = insere_perfil(&pool, "veterinario", "Dra. Carla").await;

    let com_historico = queries::create_pet(&pool, &novo_pet(tutora, "Rex"))
        .await
        .expect("pet");
    queries::create_consulta(&pool, &nova_consulta(com_historico.id, vet, tutora, Utc::now()))
        .await
        .expect("consulta");

    // Registros clínicos não são removidos em cascata: a exclusão falha
    let bloqueada = queries::delete_pet(&pool, com_historico.id).await;
    assert!(matches!(bloqueada, Err(DbError::ConstraintViolation(_))));

    // Sem histórico, a exclusão procede
    let sem_historico = queries::create_pet(&pool, &novo_pet(tutora, "Mimi"))
        .await
        .expect("pet");
    queries::delete_pet(&pool, sem_historico.id).await.expect("exclui");
    let busca = queries::get_pet_by_id(&pool, sem_historico.id).await;
    assert!(matches!(busca, Err(DbError::NotFound(_))));
}

#[tokio::test]
async fn validacao_rejeita_payload_invalido() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;

    let mut sem_nome = novo_pet(tutora, "");
    sem_nome.weight = Some(10.0);
    assert!(matches!(
        queries::create_pet(&pool, &sem_nome).await,
        Err(DbError::ValidationError(_))
    ));

    let mut peso_invalido = novo_pet(tutora, "Rex");
    peso_invalido.weight = Some(-2.0);
    assert!(matches!(
        queries::create_pet(&pool, &peso_invalido).await,
        Err(DbError::ValidationError(_))
    ));

    // Nada foi gravado
    let todos = queries::list_pets(&pool, None).await.expect("lista");
    assert!(todos.is_empty());
}

#[tokio::test]
async fn veterinarios_ordenados_e_idempotentes() {
    let (_dir, pool) = pool_de_teste().await;
    insere_perfil(&pool, "veterinario", "Dra. Carla").await;
    insere_perfil(&pool, "veterinario", "Dr. Abel").await;
    insere_perfil(&pool, "tutor", "Ana").await;

    let primeira = queries::list_veterinarios(&pool).await.expect("lista");
    let nomes: Vec<&str> = primeira.iter().map(|perfil| perfil.name.as_str()).collect();
    assert_eq!(nomes, vec!["Dr. Abel", "Dra. Carla"]);

    // Sem escritas no meio, duas chamadas produzem a mesma sequência
    let segunda = queries::list_veterinarios(&pool).await.expect("lista");
    let ids_primeira: Vec<Uuid> = primeira.iter().map(|perfil| perfil.id).collect();
    let ids_segunda: Vec<Uuid> = segunda.iter().map(|perfil| perfil.id).collect();
    assert_eq!(ids_primeira, ids_segunda);
}

#[tokio::test]
async fn prescricoes_e_exames_escopados_por_veterinario() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let vet = insere_perfil(&pool, "veterinario", "Dra. Carla").await;
    let vet2 = insere_perfil(&pool, "veterinario", "Dr. Davi").await;

    let pet = queries::create_pet(&pool, &novo_pet(tutora, "Rex"))
        .await
        .expect("pet");
    let consulta = queries::create_consulta(&pool, &nova_consulta(pet.id, vet, tutora, Utc::now()))
        .await
        .expect("consulta");

    let da_vet = queries::create_prescricao(&pool, &nova_prescricao(consulta.id, pet.id, vet))
        .await
        .expect("prescrição");
    queries::create_prescricao(&pool, &nova_prescricao(consulta.id, pet.id, vet2))
        .await
        .expect("prescrição");

    let escopadas = queries::list_prescricoes(&pool, None, Some(vet))
        .await
        .expect("lista");
    assert_eq!(escopadas.len(), 1);
    assert_eq!(escopadas[0].prescricao.id, da_vet.id);
    assert_eq!(escopadas[0].consulta.id, consulta.id);
    assert_eq!(escopadas[0].pet.id, pet.id);
    assert_eq!(escopadas[0].veterinario.id, vet);

    let todas = queries::list_prescricoes(&pool, None, None).await.expect("lista");
    assert_eq!(todas.len(), 2);

    // Exames seguem o mesmo escopo; consulta de origem é opcional
    let exame_avulso = petcuidado_db::NovoExame {
        consulta_id: None,
        pet_id: pet.id,
        veterinario_id: vet,
        tipo_exame: "Hemograma".to_string(),
        data_exame: Utc::now().date_naive(),
        resultado: None,
        arquivo_url: None,
        observacoes: None,
        status: Default::default(),
    };
    queries::create_exame(&pool, &exame_avulso).await.expect("exame");

    let exames_da_vet = queries::list_exames(&pool, None, Some(vet)).await.expect("lista");
    assert_eq!(exames_da_vet.len(), 1);
    assert!(exames_da_vet[0].consulta.is_none());
    let exames_do_outro = queries::list_exames(&pool, None, Some(vet2)).await.expect("lista");
    assert!(exames_do_outro.is_empty());
}

#[tokio::test]
async fn vacinas_nao_tem_escopo_por_usuario() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let tutor2 = insere_perfil(&pool, "tutor", "Bruno").await;
    let vet = insere_perfil(&pool, "veterinario", "Dra. Carla").await;

    let p1 = queries::create_pet(&pool, &novo_pet(tutora, "Rex")).await.expect("pet");
    let p2 = queries::create_pet(&pool, &novo_pet(tutor2, "Mimi")).await.expect("pet");

    let com_vet = NovaVacina {
        pet_id: p1.id,
        nome_vacina: "Antirrábica".to_string(),
        data_aplicacao: Utc::now().date_naive(),
        proxima_dose: None,
        veterinario_id: Some(vet),
        lote: Some("L-2041".to_string()),
        fabricante: None,
        observacoes: None,
    };
    queries::create_vacina(&pool, &com_vet).await.expect("vacina");

    let sem_vet = NovaVacina {
        pet_id: p2.id,
        nome_vacina: "V10".to_string(),
        data_aplicacao: Utc::now().date_naive(),
        proxima_dose: None,
        veterinario_id: None,
        lote: None,
        fabricante: None,
        observacoes: None,
    };
    queries::create_vacina(&pool, &sem_vet).await.expect("vacina");

    // A listagem não aceita escopo por usuário: qualquer chamador vê tudo
    let todas = queries::list_vacinas(&pool, None).await.expect("lista");
    assert_eq!(todas.len(), 2);

    let do_p1 = queries::list_vacinas(&pool, Some(p1.id)).await.expect("lista");
    assert_eq!(do_p1.len(), 1);
    assert_eq!(do_p1[0].pet.id, p1.id);
    assert_eq!(do_p1[0].veterinario.as_ref().map(|perfil| perfil.id), Some(vet));

    let do_p2 = queries::list_vacinas(&pool, Some(p2.id)).await.expect("lista");
    assert!(do_p2[0].veterinario.is_none());
}

#[tokio::test]
async fn capacidade_de_tutor_nao_alcanca_dados_alheios() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let tutor2 = insere_perfil(&pool, "tutor", "Bruno").await;

    let proprio = queries::create_pet(&pool, &novo_pet(tutora, "Rex")).await.expect("pet");
    let alheio = queries::create_pet(&pool, &novo_pet(tutor2, "Mimi")).await.expect("pet");

    let acesso = ScopedAccess::new(pool.clone(), carrega_perfil(&pool, tutora).await);

    let visiveis = acesso.pets().await.expect("lista");
    assert_eq!(visiveis.len(), 1);
    assert_eq!(visiveis[0].id, proprio.id);

    // Pets de outros tutores aparecem como inexistentes
    assert!(matches!(acesso.pet(alheio.id).await, Err(DbError::NotFound(_))));
    assert!(matches!(
        acesso.update_pet(alheio.id, &AtualizaPet::default()).await,
        Err(DbError::NotFound(_))
    ));
    assert!(matches!(acesso.delete_pet(alheio.id).await, Err(DbError::NotFound(_))));

    // Operações administrativas são negadas
    assert!(matches!(acesso.users().await, Err(DbError::Forbidden(_))));
    assert!(matches!(acesso.overview().await, Err(DbError::Forbidden(_))));

    // O dono do cadastro é sempre o próprio usuário, mesmo que o payload
    // aponte outro tutor
    let forjado = novo_pet(tutor2, "Thor");
    let criado = acesso.create_pet(forjado).await.expect("cadastra");
    assert_eq!(criado.user_id, tutora);
}

#[tokio::test]
async fn capacidade_de_admin_alcanca_tudo() {
    let (_dir, pool) = pool_de_teste().await;
    let admin = insere_perfil(&pool, "admin", "Zoe").await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let vet = insere_perfil(&pool, "veterinario", "Dra. Carla").await;

    let pet = queries::create_pet(&pool, &novo_pet(tutora, "Rex")).await.expect("pet");
    queries::create_consulta(&pool, &nova_consulta(pet.id, vet, tutora, Utc::now()))
        .await
        .expect("consulta");

    let acesso = ScopedAccess::new(pool.clone(), carrega_perfil(&pool, admin).await);

    assert_eq!(acesso.pets().await.expect("lista").len(), 1);
    assert_eq!(acesso.consultas(None).await.expect("lista").len(), 1);
    assert_eq!(acesso.users().await.expect("lista").len(), 3);

    let visao = acesso.overview().await.expect("visão");
    assert!(visao.total_usuarios.computed);
    assert_eq!(visao.total_usuarios.value, 3);
    assert_eq!(visao.total_pets.value, 1);
    assert_eq!(visao.total_consultas.value, 1);
    assert_eq!(visao.total_veterinarios.value, 1);
}

#[tokio::test]
async fn capacidade_de_veterinario_assina_os_proprios_registros() {
    let (_dir, pool) = pool_de_teste().await;
    let tutora = insere_perfil(&pool, "tutor", "Ana").await;
    let vet = insere_perfil(&pool, "veterinario", "Dra. Carla").await;
    let vet2 = insere_perfil(&pool, "veterinario", "Dr. Davi").await;

    let pet = queries::create_pet(&pool, &novo_pet(tutora, "Rex")).await.expect("pet");
    let acesso = ScopedAccess::new(pool.clone(), carrega_perfil(&pool, vet).await);

    // Mesmo apontando outro profissional no payload, a consulta sai em nome
    // de quem assina
    let consulta = acesso
        .create_consulta(nova_consulta(pet.id, vet2, tutora, Utc::now()))
        .await
        .expect("consulta");
    assert_eq!(consulta.veterinario_id, vet);

    let prescricao = acesso
        .create_prescricao(nova_prescricao(consulta.id, pet.id, vet2))
        .await
        .expect("prescrição");
    assert_eq!(prescricao.veterinario_id, vet);

    // A listagem escopada devolve só o que é do profissional
    let minhas = acesso.prescricoes(None).await.expect("lista");
    assert_eq!(minhas.len(), 1);
    assert_eq!(minhas[0].prescricao.id, prescricao.id);
}
