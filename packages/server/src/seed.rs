use chrono::Utc;
use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict};
use sea_orm::*;
use tracing::info;

use crate::entity::{entry, evaluation, judging_setting};

/// Seed the singleton `judging_setting` row with no explicit current contest.
pub async fn seed_settings(db: &DatabaseConnection) -> Result<(), DbErr> {
    let model = judging_setting::ActiveModel {
        id: Set(judging_setting::SINGLETON_ID),
        current_contest_id: Set(None),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = judging_setting::Entity::insert(model)
        .on_conflict(
            OnConflict::column(judging_setting::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(n) if n > 0 => info!("Seeded judging settings"),
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't create composite indexes, so we create them
/// manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One evaluation per (entry, evaluator). The claim broker relies on this
    // to reject a second placeholder for the same pair.
    let index = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_evaluation_entry_evaluator")
        .table(evaluation::Entity)
        .col(evaluation::Column::EntryId)
        .col(evaluation::Column::EvaluatorId)
        .to_owned();
    db.execute_raw(build_index(db, &index)).await?;
    info!("Ensured index uq_evaluation_entry_evaluator exists");

    // Candidate and progress scans:
    // SELECT ... FROM entry WHERE contest_id = ? AND assigned_group_id = ?
    let index = Index::create()
        .if_not_exists()
        .name("idx_entry_contest_group")
        .table(entry::Entity)
        .col(entry::Column::ContestId)
        .col(entry::Column::AssignedGroupId)
        .to_owned();
    match db.execute_raw(build_index(db, &index)).await {
        Ok(_) => {
            info!("Ensured index idx_entry_contest_group exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_entry_contest_group: {}", e);
        }
    }

    Ok(())
}

fn build_index(db: &DatabaseConnection, index: &IndexCreateStatement) -> Statement {
    db.get_database_backend().build(index)
}
