/// Access and ordering against a live PostgreSQL
///
/// Run with: cargo test -p kanban-shared --test board_flow_tests -- --ignored

mod common;

use kanban_shared::access::{Operation, Role, RoleResolver};
use kanban_shared::ids::{BoardId, CardId, ColumnId, ResourceRef};
use kanban_shared::error::{CoreError, CoreResult};
use kanban_shared::models::assignment::Assignment;
use kanban_shared::models::board::{Board, CreateBoard, UpdateBoard};
use kanban_shared::models::card::{Card, CreateCard};
use kanban_shared::models::column::Column;
use kanban_shared::models::comment::Comment;
use kanban_shared::models::membership::{CreateMembership, GuardedWrite, Membership};
use kanban_shared::ordering::store;
use kanban_shared::ordering::MoveRequest;
use sqlx::PgPool;
use tokio::task::JoinHandle;

async fn new_card(pool: &PgPool, column: ColumnId, title: &str) -> Card {
    store::create_card(
        pool,
        column,
        CreateCard {
            title: title.to_string(),
            description: String::new(),
            deadline: None,
        },
    )
    .await
    .unwrap()
}

async fn card_order(pool: &PgPool, column: ColumnId) -> Vec<(CardId, i32)> {
    Card::list_by_column(pool, column)
        .await
        .unwrap()
        .into_iter()
        .map(|card| (card.id, card.order_index))
        .collect()
}

async fn board(pool: &PgPool, owner: kanban_shared::ids::UserId) -> BoardId {
    Board::create(
        pool,
        owner,
        CreateBoard {
            name: "Sprint".to_string(),
            background: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_card_moves_to_head_of_other_column() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let board_id = board(&pool, owner.id).await;

    let c1 = store::create_column(&pool, board_id, "C1").await.unwrap();
    let c2 = store::create_column(&pool, board_id, "C2").await.unwrap();
    assert_eq!((c1.order_index, c2.order_index), (0, 1));

    let a = new_card(&pool, c1.id, "A").await;
    let b = new_card(&pool, c1.id, "B").await;
    let c = new_card(&pool, c2.id, "C").await;

    let moved = store::move_card(
        &pool,
        MoveRequest {
            target_id: b.id,
            new_container_id: Some(c2.id),
            previous_id: None,
            next_id: Some(c.id),
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.source_column, c1.id);
    assert_eq!(moved.destination_column, c2.id);

    assert_eq!(card_order(&pool, c1.id).await, vec![(a.id, 0)]);
    assert_eq!(card_order(&pool, c2.id).await, vec![(b.id, 0), (c.id, 1)]);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_move_to_own_slot_changes_nothing() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let board_id = board(&pool, owner.id).await;
    let column = store::create_column(&pool, board_id, "Todo").await.unwrap();

    let a = new_card(&pool, column.id, "A").await;
    let b = new_card(&pool, column.id, "B").await;
    let c = new_card(&pool, column.id, "C").await;
    let before = card_order(&pool, column.id).await;

    store::move_card(
        &pool,
        MoveRequest {
            target_id: b.id,
            new_container_id: None,
            previous_id: Some(a.id),
            next_id: Some(c.id),
        },
    )
    .await
    .unwrap();

    assert_eq!(card_order(&pool, column.id).await, before);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_cross_board_move_rejected() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let first = board(&pool, owner.id).await;
    let second = board(&pool, owner.id).await;

    let here = store::create_column(&pool, first, "Here").await.unwrap();
    let there = store::create_column(&pool, second, "There").await.unwrap();
    let card = new_card(&pool, here.id, "Card").await;

    let result = store::move_card(
        &pool,
        MoveRequest {
            target_id: card.id,
            new_container_id: Some(there.id),
            previous_id: None,
            next_id: None,
        },
    )
    .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));

    let result = store::move_column(
        &pool,
        first,
        MoveRequest {
            target_id: here.id,
            new_container_id: Some(second),
            previous_id: None,
            next_id: None,
        },
    )
    .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_missing_anchor_is_not_found() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let board_id = board(&pool, owner.id).await;
    let column = store::create_column(&pool, board_id, "Todo").await.unwrap();
    let card = new_card(&pool, column.id, "A").await;

    let result = store::move_card(
        &pool,
        MoveRequest {
            target_id: card.id,
            new_container_id: None,
            previous_id: Some(CardId::new(i64::MAX)),
            next_id: None,
        },
    )
    .await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_columns_stay_dense_after_move_and_delete() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let board_id = board(&pool, owner.id).await;

    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        ids.push(store::create_column(&pool, board_id, title).await.unwrap().id);
    }

    // D to the front
    let columns = store::move_column(
        &pool,
        board_id,
        MoveRequest {
            target_id: ids[3],
            new_container_id: None,
            previous_id: None,
            next_id: Some(ids[0]),
        },
    )
    .await
    .unwrap();
    let order: Vec<ColumnId> = columns.iter().map(|c| c.id).collect();
    assert_eq!(order, vec![ids[3], ids[0], ids[1], ids[2]]);

    store::delete_column(&pool, ids[0]).await.unwrap();
    let columns = Column::list_by_board(&pool, board_id).await.unwrap();
    let indices: Vec<i32> = columns.iter().map(|c| c.order_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_resolver_distinguishes_missing_from_forbidden() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let stranger = common::create_user(&pool, "stranger").await;
    let board_id = board(&pool, owner.id).await;
    let column = store::create_column(&pool, board_id, "Todo").await.unwrap();
    let card = new_card(&pool, column.id, "A").await;
    let comment = Comment::create(&pool, card.id, owner.id, "hi").await.unwrap();

    let resolver = RoleResolver::new(pool.clone());

    let resolution = resolver.resolve(owner.id, ResourceRef::Comment(comment.id)).await.unwrap();
    assert_eq!(resolution.role, Role::Admin);
    assert_eq!(resolution.board_id, board_id);
    assert_eq!(resolution.column_id, Some(column.id));
    assert_eq!(resolution.card_id, Some(card.id));

    let result = resolver.resolve(stranger.id, ResourceRef::Card(card.id)).await;
    assert!(matches!(result, Err(CoreError::NotPermitted(_))));

    let result = resolver.resolve(owner.id, ResourceRef::Card(CardId::new(i64::MAX))).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_viewer_can_read_but_not_mutate() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let viewer = common::create_user(&pool, "viewer").await;
    let board_id = board(&pool, owner.id).await;

    Membership::create(
        &pool,
        CreateMembership {
            board_id,
            user_id: viewer.id,
            role: Role::Viewer,
            added_by: Some(owner.id),
        },
    )
    .await
    .unwrap();

    let resolver = RoleResolver::new(pool.clone());
    let board_ref = ResourceRef::Board(board_id);

    resolver.require(viewer.id, board_ref, &Operation::Read).await.unwrap();
    let result = resolver.require(viewer.id, board_ref, &Operation::MutateContent).await;
    assert!(matches!(result, Err(CoreError::NotPermitted(_))));

    let verbose = resolver.resolve_verbose(viewer.id, board_ref).await.unwrap();
    assert_eq!(verbose.membership.role, Role::Viewer);
    assert_eq!(verbose.added_by.map(|p| p.id), Some(owner.id));
    assert!(verbose.updated_by.is_none());
}

fn spawn_move(
    pool: &PgPool,
    card: CardId,
    to: ColumnId,
    previous: Option<CardId>,
    next: Option<CardId>,
) -> JoinHandle<CoreResult<()>> {
    let pool = pool.clone();
    tokio::spawn(async move {
        store::move_card(
            &pool,
            MoveRequest {
                target_id: card,
                new_container_id: Some(to),
                previous_id: previous,
                next_id: next,
            },
        )
        .await
        .map(|_| ())
    })
}

fn assert_dense(order: &[(CardId, i32)]) {
    let indices: Vec<i32> = order.iter().map(|(_, index)| *index).collect();
    let expected: Vec<i32> = (0..order.len() as i32).collect();
    assert_eq!(indices, expected);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_concurrent_edits_keep_columns_dense() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let board_id = board(&pool, owner.id).await;

    let left = store::create_column(&pool, board_id, "Left").await.unwrap().id;
    let right = store::create_column(&pool, board_id, "Right").await.unwrap().id;
    for i in 0..4 {
        new_card(&pool, left, &format!("L{}", i)).await;
        new_card(&pool, right, &format!("R{}", i)).await;
    }

    let mut succeeded = 0;
    for round in 0..20 {
        let (from, to) = if round % 2 == 0 { (left, right) } else { (right, left) };
        let src: Vec<CardId> = card_order(&pool, from).await.into_iter().map(|(id, _)| id).collect();
        let dst: Vec<CardId> = card_order(&pool, to).await.into_iter().map(|(id, _)| id).collect();

        let mut tasks = Vec::new();
        if let (Some(&first), Some(&last)) = (src.first(), src.last()) {
            // Same source, same destination, overlapping anchors
            tasks.push(spawn_move(&pool, first, to, dst.last().copied(), None));
            tasks.push(spawn_move(&pool, last, to, None, dst.first().copied()));
        }
        if let Some(&head) = dst.first() {
            tasks.push(spawn_move(&pool, head, from, None, src.first().copied()));
        }
        for column in [from, to] {
            let pool = pool.clone();
            tasks.push(tokio::spawn(async move {
                store::create_card(
                    &pool,
                    column,
                    CreateCard {
                        title: format!("new {}", round),
                        description: String::new(),
                        deadline: None,
                    },
                )
                .await
                .map(|_| ())
            }));
        }
        if let Some(&victim) = src.get(1) {
            let pool = pool.clone();
            tasks.push(tokio::spawn(async move { store::delete_card(&pool, victim).await }));
        }

        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => succeeded += 1,
                Err(CoreError::NotFound(_)) | Err(CoreError::Validation(_)) => {}
                Err(other) => panic!("round {}: unexpected error {:?}", round, other),
            }
        }

        assert_dense(&card_order(&pool, left).await);
        assert_dense(&card_order(&pool, right).await);
    }

    assert!(succeeded > 0);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_role_writes_require_the_authorized_role() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let member = common::create_user(&pool, "member").await;
    let board_id = board(&pool, owner.id).await;

    Membership::create(
        &pool,
        CreateMembership {
            board_id,
            user_id: member.id,
            role: Role::Viewer,
            added_by: Some(owner.id),
        },
    )
    .await
    .unwrap();

    // Promoted to admin after someone else read them as viewer
    let promoted = Membership::update_role(&pool, board_id, member.id, Role::Viewer, Role::Admin, owner.id)
        .await
        .unwrap();
    assert!(matches!(promoted, GuardedWrite::Done(ref m) if m.role == Role::Admin));

    let stale = Membership::update_role(&pool, board_id, member.id, Role::Viewer, Role::Editor, owner.id)
        .await
        .unwrap();
    assert!(matches!(stale, GuardedWrite::RoleChanged(Role::Admin)));

    let stale = Membership::delete(&pool, board_id, member.id, Role::Viewer).await.unwrap();
    assert_eq!(stale, GuardedWrite::RoleChanged(Role::Admin));
    assert_eq!(
        Membership::get_role(&pool, board_id, member.id).await.unwrap(),
        Some(Role::Admin)
    );

    let stranger = common::create_user(&pool, "stranger").await;
    let missing = Membership::delete(&pool, board_id, stranger.id, Role::Viewer).await.unwrap();
    assert_eq!(missing, GuardedWrite::Missing);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_removed_member_loses_assignments() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let member = common::create_user(&pool, "member").await;
    let board_id = board(&pool, owner.id).await;
    let column = store::create_column(&pool, board_id, "Todo").await.unwrap();
    let card = new_card(&pool, column.id, "A").await;

    Membership::create(
        &pool,
        CreateMembership {
            board_id,
            user_id: member.id,
            role: Role::Editor,
            added_by: Some(owner.id),
        },
    )
    .await
    .unwrap();
    Assignment::assign(&pool, card.id, member.id, owner.id).await.unwrap();
    Assignment::assign(&pool, card.id, owner.id, owner.id).await.unwrap();

    let removed = Membership::delete(&pool, board_id, member.id, Role::Editor).await.unwrap();
    assert_eq!(removed, GuardedWrite::Done(()));

    let assignees: Vec<_> = Assignment::assignees(&pool, card.id)
        .await
        .unwrap()
        .into_iter()
        .map(|profile| profile.id)
        .collect();
    assert_eq!(assignees, vec![owner.id]);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_board_background_can_be_cleared() {
    let pool = common::migrated_pool().await;
    let owner = common::create_user(&pool, "owner").await;
    let board_id = board(&pool, owner.id).await;

    let set = Board::update(
        &pool,
        board_id,
        UpdateBoard {
            name: None,
            background: Some(Some("bg/forest.jpg".to_string())),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(set.background.as_deref(), Some("bg/forest.jpg"));

    let renamed = Board::update(
        &pool,
        board_id,
        UpdateBoard {
            name: Some("Renamed".to_string()),
            background: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.background.as_deref(), Some("bg/forest.jpg"));

    let cleared = Board::update(
        &pool,
        board_id,
        UpdateBoard {
            name: None,
            background: Some(None),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.background, None);
    assert_eq!(cleared.name, "Renamed");
}
