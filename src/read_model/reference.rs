use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{PetCategory, SuccessStory};
use crate::error::{AppError, AppResult};

fn story_from_row(row: &Row<'_>) -> rusqlite::Result<SuccessStory> {
    Ok(SuccessStory {
        id: row.get(0)?,
        pet_name: row.get(1)?,
        image: row.get(2)?,
        adopter_name: row.get(3)?,
        story: row.get(4)?,
        adopted_on: row.get(5)?,
    })
}

pub fn list_success_stories(conn: &Connection) -> AppResult<Vec<SuccessStory>> {
    let mut stmt = conn.prepare(
        "SELECT id, pet_name, image, adopter_name, story, adopted_on
         FROM success_stories ORDER BY rowid",
    )?;
    let stories = stmt
        .query_map([], story_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stories)
}

pub fn get_success_story(conn: &Connection, id: &str) -> AppResult<SuccessStory> {
    conn.query_row(
        "SELECT id, pet_name, image, adopter_name, story, adopted_on
         FROM success_stories WHERE id = ?1",
        params![id],
        story_from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

pub fn list_categories(conn: &Connection) -> AppResult<Vec<PetCategory>> {
    let mut stmt = conn.prepare("SELECT id, name, image FROM pet_categories ORDER BY rowid")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(PetCategory {
                id: row.get(0)?,
                name: row.get(1)?,
                image: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}
