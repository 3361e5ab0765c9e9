//! User and pet factories and seeders.

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use furrow_seeding::prelude::*;

/// Entity name of users.
pub const USER: &str = "User";

/// Entity name of pets.
pub const PET: &str = "Pet";

/// Users with a fake name and email.
pub struct UserFactory;

impl FactoryDefinition for UserFactory {
	fn options(&self) -> FactoryOptions {
		FactoryOptions::new().entity(EntitySchema::new(USER).defaults(|user| {
			user.set("name", Name().fake::<String>())
				.set("email", SafeEmail().fake::<String>());
		}))
	}
}

/// Pets whose owner is created alongside them unless given.
pub struct PetFactory;

#[async_trait]
impl FactoryDefinition for PetFactory {
	fn options(&self) -> FactoryOptions {
		FactoryOptions::new()
			.entity(
				EntitySchema::new(PET)
					.defaults(|pet| {
						pet.set("name", "Fluffy");
					})
					.deferred(["owner"]),
			)
			.sub_factory("owner", user_factory())
	}

	async fn entity(&self, factory: &Factory, entity: Option<Draft>) -> SeedingResult<Draft> {
		let mut pet = entity.ok_or_else(|| SeedingError::NoEntity(PET.to_string()))?;
		pet.set("owner", factory.sub_factory("owner")?);
		Ok(pet)
	}
}

/// Binding building a fresh [`UserFactory`].
pub fn user_factory() -> Binding<Factory> {
	Binding::constructor(|source: &SeedingSource| Factory::new(UserFactory, source))
}

/// Binding building a fresh [`PetFactory`].
pub fn pet_factory() -> Binding<Factory> {
	Binding::constructor(|source: &SeedingSource| Factory::new(PetFactory, source))
}

/// Creates ten users, then runs its child seeders.
pub struct UserSeeder;

#[async_trait]
impl SeederDefinition for UserSeeder {
	fn options(&self) -> SeederOptions {
		SeederOptions::new()
			.factory("user", user_factory())
			.seeder(Binding::constructor(|source: &SeedingSource| {
				Seeder::new(PetSeeder::default(), source)
			}))
	}

	async fn run(&self, seeder: &Seeder) -> SeedingResult<()> {
		seeder
			.factory("user")?
			.create_many(10, Overrides::new(), &SaveOptions::default())
			.await?;
		seeder.call().await
	}
}

/// Creates one pet per stored owner, pointing each pet at its owner's id.
pub struct PetSeeder {
	/// Entity name of the owners.
	pub owners: &'static str,
}

impl Default for PetSeeder {
	fn default() -> Self {
		Self { owners: USER }
	}
}

#[async_trait]
impl SeederDefinition for PetSeeder {
	fn options(&self) -> SeederOptions {
		SeederOptions::new().factory("pet", pet_factory())
	}

	async fn run(&self, seeder: &Seeder) -> SeedingResult<()> {
		let pets = seeder.factory("pet")?;
		let owners = seeder.source().find_all(self.owners).await?;
		for owner in owners {
			let Some(owner_id) = owner.id().cloned() else {
				continue;
			};
			pets.create(
				Overrides::new().set("owner", owner_id),
				&SaveOptions::default(),
			)
			.await?;
		}
		Ok(())
	}
}
