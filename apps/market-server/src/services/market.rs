//! The market page: what is for sale and what the caller owns.

use serde::Serialize;
use ts_rs::TS;

use market_core::{Item, Money, User};
use market_db::repository::items;
use market_db::Database;

use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct MarketView {
    /// Items with no owner.
    pub available: Vec<Item>,
    /// Items the caller can sell back.
    pub owned: Vec<Item>,
    pub budget: Money,
}

pub async fn market_view(db: &Database, user: &User) -> AppResult<MarketView> {
    let mut conn = db.acquire().await?;

    let available = items::list_available(&mut conn).await?;
    let owned = items::list_owned_by(&mut conn, user.id).await?;

    Ok(MarketView {
        available,
        owned,
        budget: user.budget(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ownership;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_market_splits_available_and_owned() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let bob = user(&db, "bob", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let chair = item(&db, "Chair", 50).await;
        item(&db, "Mouse", 10).await;

        let mut tx = db.begin().await.unwrap();
        ownership::buy(&mut tx, lamp.id, alice.id).await.unwrap();
        ownership::buy(&mut tx, chair.id, bob.id).await.unwrap();
        tx.commit().await.unwrap();

        let alice = reload_user(&db, alice.id).await;
        let view = market_view(&db, &alice).await.unwrap();

        assert_eq!(view.available.len(), 1);
        assert_eq!(view.available[0].name, "Mouse");
        assert_eq!(view.owned.len(), 1);
        assert_eq!(view.owned[0].id, lamp.id);
        assert_eq!(view.budget.units(), 60);
    }
}
