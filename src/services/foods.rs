//! Foods catalogue

use crate::db::{Gateway, RawResult, Statement};
use crate::error::DbResult;

const ALL_FOODS: &str = "SELECT food_id, food_name, calories, protein, carbs, fats \
     FROM foods ORDER BY food_name";

pub struct FoodService<'g, G> {
    gateway: &'g G,
}

impl<'g, G: Gateway> FoodService<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Every food, alphabetically, for the meal item picker
    pub async fn all_foods(&self) -> DbResult<RawResult> {
        self.gateway.execute(Statement::Query(ALL_FOODS), &[]).await
    }
}
