/// Persistence for everything that changes an `order_index`
///
/// Every write here runs in one transaction that first locks the container
/// row(s) involved (`SELECT … FOR UPDATE`, ascending id order), then reads
/// the ordered membership, plans in memory and writes the changed rows back.
/// Two concurrent moves into the same column therefore serialize on the
/// column lock instead of interleaving their renumbering. The deferred unique
/// constraints on `(board_id, order_index)` and `(column_id, order_index)`
/// only check at commit, which lets the batch pass through transient
/// duplicates.
///
/// Creates append at the tail and deletes close the gap under the same locks,
/// so indices stay `{0, …, n-1}` after any mix of operations.
///
/// # Example
///
/// ```no_run
/// use kanban_shared::ids::{CardId, ColumnId};
/// use kanban_shared::ordering::plan::MoveRequest;
/// use kanban_shared::ordering::store;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), kanban_shared::error::CoreError> {
/// let moved = store::move_card(&pool, MoveRequest {
///     target_id: CardId::new(2),
///     new_container_id: Some(ColumnId::new(11)),
///     previous_id: None,
///     next_id: Some(CardId::new(3)),
/// }).await?;
/// assert_eq!(moved.destination_column, ColumnId::new(11));
/// # Ok(())
/// # }
/// ```

use sqlx::{PgPool, Postgres, Transaction};

use super::plan::{plan_move, Anchors, MovePlan, MoveRequest};
use crate::error::{CoreError, CoreResult};
use crate::ids::{BoardId, CardId, ColumnId};
use crate::models::card::{Card, CreateCard};
use crate::models::column::{Column, COLUMN_COLUMNS};

/// Result of a card move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    pub source_column: ColumnId,
    pub destination_column: ColumnId,
    pub plan: MovePlan<CardId>,
}

/// Appends a new column at the right end of the board
pub async fn create_column(pool: &PgPool, board_id: BoardId, title: &str) -> CoreResult<Column> {
    let mut tx = pool.begin().await?;
    lock_board(&mut tx, board_id).await?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM columns WHERE board_id = $1")
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;

    let column = sqlx::query_as::<_, Column>(&format!(
        "INSERT INTO columns (board_id, title, order_index) VALUES ($1, $2, $3) RETURNING {}",
        COLUMN_COLUMNS
    ))
    .bind(board_id)
    .bind(title)
    .bind(count as i32)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(board_id = %board_id, column_id = %column.id, order_index = column.order_index, "Column created");
    Ok(column)
}

/// Deletes a column (and its cards) and closes the gap it leaves
pub async fn delete_column(pool: &PgPool, column_id: ColumnId) -> CoreResult<()> {
    let board_id = sqlx::query_scalar::<_, BoardId>("SELECT board_id FROM columns WHERE id = $1")
        .bind(column_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::not_found(column_id))?;

    let mut tx = pool.begin().await?;
    lock_board(&mut tx, board_id).await?;

    let removed_index = sqlx::query_scalar::<_, i32>(
        "DELETE FROM columns WHERE id = $1 AND board_id = $2 RETURNING order_index",
    )
    .bind(column_id)
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| CoreError::not_found(column_id))?;

    sqlx::query(
        "UPDATE columns SET order_index = order_index - 1 WHERE board_id = $1 AND order_index > $2",
    )
    .bind(board_id)
    .bind(removed_index)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(board_id = %board_id, column_id = %column_id, "Column deleted");
    Ok(())
}

/// Appends a new card at the bottom of a column
pub async fn create_card(pool: &PgPool, column_id: ColumnId, data: CreateCard) -> CoreResult<Card> {
    let mut tx = pool.begin().await?;
    lock_columns(&mut tx, &[column_id]).await?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cards WHERE column_id = $1")
        .bind(column_id)
        .fetch_one(&mut *tx)
        .await?;

    let card_id = sqlx::query_scalar::<_, CardId>(
        r#"
        INSERT INTO cards (column_id, title, description, deadline, order_index)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(column_id)
    .bind(data.title)
    .bind(data.description)
    .bind(data.deadline)
    .bind(count as i32)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(column_id = %column_id, card_id = %card_id, order_index = count, "Card created");
    Card::find_by_id(pool, card_id)
        .await?
        .ok_or_else(|| CoreError::not_found(card_id))
}

/// Deletes a card and closes the gap in its column
pub async fn delete_card(pool: &PgPool, card_id: CardId) -> CoreResult<()> {
    let column_id = card_column(pool, card_id).await?;

    let mut tx = pool.begin().await?;
    lock_columns(&mut tx, &[column_id]).await?;

    let removed_index = sqlx::query_scalar::<_, i32>(
        "DELETE FROM cards WHERE id = $1 AND column_id = $2 RETURNING order_index",
    )
    .bind(card_id)
    .bind(column_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| CoreError::not_found(card_id))?;

    sqlx::query(
        "UPDATE cards SET order_index = order_index - 1 WHERE column_id = $1 AND order_index > $2",
    )
    .bind(column_id)
    .bind(removed_index)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(column_id = %column_id, card_id = %card_id, "Card deleted");
    Ok(())
}

/// Moves a column within its board
///
/// Returns the board's columns in their new order.
pub async fn move_column(
    pool: &PgPool,
    board_id: BoardId,
    request: MoveRequest<ColumnId, BoardId>,
) -> CoreResult<Vec<Column>> {
    if let Some(destination) = request.new_container_id {
        if destination != board_id {
            return Err(CoreError::validation(format!(
                "columns cannot move between boards ({} to {})",
                board_id, destination
            )));
        }
    }

    let mut tx = pool.begin().await?;
    lock_board(&mut tx, board_id).await?;

    ensure_columns_exist(&mut tx, request.anchors()).await?;

    let before = column_ids(&mut tx, board_id).await?;
    let plan = plan_move(&before, None, request.target_id, request.anchors())?;
    write_columns(&mut tx, board_id, &changed_placements(&before, &plan.source)).await?;

    tx.commit().await?;

    tracing::info!(board_id = %board_id, column_id = %request.target_id, "Column moved");
    Ok(Column::list_by_board(pool, board_id).await?)
}

/// Moves a card within its column or to another column of the same board
pub async fn move_card(pool: &PgPool, request: MoveRequest<CardId, ColumnId>) -> CoreResult<CardMove> {
    let target = request.target_id;
    let source_column = card_column(pool, target).await?;
    let destination_column = request.new_container_id.unwrap_or(source_column);

    // Ownership first: a cross-board move fails before any list is read
    if destination_column != source_column {
        let source_board = column_board(pool, source_column).await?;
        let destination_board = column_board(pool, destination_column).await?;
        if source_board != destination_board {
            return Err(CoreError::validation(format!(
                "cards cannot move between boards ({} to {})",
                source_board, destination_board
            )));
        }
    }

    let mut tx = pool.begin().await?;
    lock_columns(&mut tx, &[source_column, destination_column]).await?;

    // The card may have moved between the lookup and the lock
    let locked_column = sqlx::query_scalar::<_, ColumnId>("SELECT column_id FROM cards WHERE id = $1")
        .bind(target)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found(target))?;
    if locked_column != source_column {
        return Err(CoreError::validation(format!("{} was moved concurrently", target)));
    }

    ensure_cards_exist(&mut tx, request.anchors()).await?;

    let source_before = card_ids(&mut tx, source_column).await?;
    let plan = if destination_column == source_column {
        let plan = plan_move(&source_before, None, target, request.anchors())?;
        write_cards(&mut tx, source_column, &changed_placements(&source_before, &plan.source)).await?;
        plan
    } else {
        let destination_before = card_ids(&mut tx, destination_column).await?;
        let plan = plan_move(
            &source_before,
            Some(destination_before.as_slice()),
            target,
            request.anchors(),
        )?;
        write_cards(&mut tx, source_column, &changed_placements(&source_before, &plan.source)).await?;
        if let Some(destination) = &plan.destination {
            write_cards(
                &mut tx,
                destination_column,
                &changed_placements(&destination_before, destination),
            )
            .await?;
        }
        plan
    };

    tx.commit().await?;

    tracing::info!(
        card_id = %target,
        from = %source_column,
        to = %destination_column,
        "Card moved"
    );

    Ok(CardMove {
        source_column,
        destination_column,
        plan,
    })
}

/// `(id, order_index)` pairs of `after` whose position differs from `before`
///
/// Items new to the container are always included.
fn changed_placements<I: Copy + Eq>(before: &[I], after: &[I]) -> Vec<(I, i32)> {
    after
        .iter()
        .enumerate()
        .filter(|(index, id)| before.get(*index) != Some(*id))
        .map(|(index, id)| (*id, index as i32))
        .collect()
}

async fn lock_board(tx: &mut Transaction<'_, Postgres>, board_id: BoardId) -> CoreResult<()> {
    sqlx::query_scalar::<_, BoardId>("SELECT id FROM boards WHERE id = $1 FOR UPDATE")
        .bind(board_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| CoreError::not_found(board_id))?;
    Ok(())
}

/// Locks the given columns in ascending id order
async fn lock_columns(tx: &mut Transaction<'_, Postgres>, columns: &[ColumnId]) -> CoreResult<()> {
    let mut ids: Vec<i64> = columns.iter().map(|id| id.get()).collect();
    ids.sort_unstable();
    ids.dedup();

    let locked = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM columns WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(&ids)
    .fetch_all(&mut **tx)
    .await?;

    match ids.iter().find(|id| !locked.contains(id)) {
        Some(missing) => Err(CoreError::not_found(ColumnId::new(*missing))),
        None => Ok(()),
    }
}

async fn card_column(pool: &PgPool, card_id: CardId) -> CoreResult<ColumnId> {
    sqlx::query_scalar::<_, ColumnId>("SELECT column_id FROM cards WHERE id = $1")
        .bind(card_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::not_found(card_id))
}

async fn column_board(pool: &PgPool, column_id: ColumnId) -> CoreResult<BoardId> {
    sqlx::query_scalar::<_, BoardId>("SELECT board_id FROM columns WHERE id = $1")
        .bind(column_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::not_found(column_id))
}

async fn column_ids(tx: &mut Transaction<'_, Postgres>, board_id: BoardId) -> CoreResult<Vec<ColumnId>> {
    Ok(
        sqlx::query_scalar::<_, ColumnId>(
            "SELECT id FROM columns WHERE board_id = $1 ORDER BY order_index ASC, id ASC",
        )
        .bind(board_id)
        .fetch_all(&mut **tx)
        .await?,
    )
}

async fn card_ids(tx: &mut Transaction<'_, Postgres>, column_id: ColumnId) -> CoreResult<Vec<CardId>> {
    Ok(
        sqlx::query_scalar::<_, CardId>(
            "SELECT id FROM cards WHERE column_id = $1 ORDER BY order_index ASC, id ASC",
        )
        .bind(column_id)
        .fetch_all(&mut **tx)
        .await?,
    )
}

/// Anchors that do not exist at all are `NotFound`; ones in another
/// container are left to the planner, which reports `Validation`
async fn ensure_columns_exist(
    tx: &mut Transaction<'_, Postgres>,
    anchors: Anchors<ColumnId>,
) -> CoreResult<()> {
    for anchor in anchors.ids() {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM columns WHERE id = $1)")
            .bind(anchor)
            .fetch_one(&mut **tx)
            .await?;
        if !exists {
            return Err(CoreError::not_found(anchor));
        }
    }
    Ok(())
}

async fn ensure_cards_exist(
    tx: &mut Transaction<'_, Postgres>,
    anchors: Anchors<CardId>,
) -> CoreResult<()> {
    for anchor in anchors.ids() {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cards WHERE id = $1)")
            .bind(anchor)
            .fetch_one(&mut **tx)
            .await?;
        if !exists {
            return Err(CoreError::not_found(anchor));
        }
    }
    Ok(())
}

async fn write_columns(
    tx: &mut Transaction<'_, Postgres>,
    board_id: BoardId,
    placements: &[(ColumnId, i32)],
) -> CoreResult<()> {
    for (column_id, order_index) in placements {
        sqlx::query("UPDATE columns SET order_index = $3 WHERE id = $1 AND board_id = $2")
            .bind(column_id)
            .bind(board_id)
            .bind(order_index)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn write_cards(
    tx: &mut Transaction<'_, Postgres>,
    column_id: ColumnId,
    placements: &[(CardId, i32)],
) -> CoreResult<()> {
    for (card_id, order_index) in placements {
        sqlx::query(
            "UPDATE cards SET column_id = $2, order_index = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(card_id)
        .bind(column_id)
        .bind(order_index)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
