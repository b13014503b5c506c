use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Race;
use crate::repository::RacesRepository;
use crate::store::Database;

pub struct RacesService;

impl RacesService {
    pub async fn create_race(db: &Database, race: Race) -> Result<Uuid> {
        if race.no_of_contestants > race.max_no_of_contestants {
            return Err(StorageError::IllegalValue(format!(
                "Race cannot hold {} contestants (max {}).",
                race.no_of_contestants, race.max_no_of_contestants
            )));
        }
        RacesRepository::new(db).create(race).await
    }

    pub async fn update_race(db: &Database, id: Uuid, race: Race) -> Result<()> {
        let repo = RacesRepository::new(db);
        let old = repo.find_by_id(id).await?;
        if race.id != old.id {
            return Err(StorageError::IllegalValue(
                "Cannot change id for race.".to_string(),
            ));
        }
        repo.update(id, race).await
    }

    pub async fn delete_race(db: &Database, id: Uuid) -> Result<()> {
        let repo = RacesRepository::new(db);
        repo.find_by_id(id).await?;
        repo.delete(id).await
    }
}
