#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ecosim::simulation::organism::animal::{Animal, Gender, Genome, accepts_mate};
use ecosim::simulation::organism::perception::{
    AnimalView, INPUT_SIZE, PlantView, Senses, TickView, in_contact, in_field_of_view,
};
use ecosim::simulation::locatable::Locatable;
use ecosim::simulation::organism::plant::Plant;
use ecosim::simulation::params::Params;
use ecosim::simulation::vector2d::Vector2D;
use ecosim::simulation::world::World;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn test_params() -> Params {
    Params::default()
}

fn animal(params: &Params, id: u64, gender: Gender, location: Vector2D) -> Animal {
    let genome = Genome::blueprint(&params.species);
    let mut rng = StdRng::seed_from_u64(id);
    let mut animal = Animal::new(id, location, genome, 1.0, 0, params, &mut rng);
    animal.gender = gender;
    animal
}

fn plant(params: &Params, id: u64, location: Vector2D) -> Plant {
    Plant::new(id, location, params.species.plant.to_dna(), 1.0, 0, params)
}

struct Scene {
    world: World,
    animals: Vec<AnimalView>,
    plants: Vec<PlantView>,
}

impl Scene {
    fn new(params: &Params, animals: &[Animal], plants: &[Plant]) -> Self {
        let mut world = World::new(400.0, 400.0, 4, 4).unwrap();
        for (i, a) in animals.iter().enumerate() {
            assert!(world.insert_animal(i, a));
        }
        for (i, p) in plants.iter().enumerate() {
            assert!(world.insert_plant(i, p));
        }
        Self {
            world,
            animals: animals.iter().map(|a| a.view(&params.animal)).collect(),
            plants: plants.iter().map(Plant::view).collect(),
        }
    }

    fn view<'a>(&'a self, params: &'a Params) -> TickView<'a> {
        TickView {
            world: &self.world,
            animals: &self.animals,
            plants: &self.plants,
            params,
            tick: 0,
        }
    }
}

#[test]
fn test_input_layout() {
    let params = test_params();
    let animals = vec![
        animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0)),
        animal(&params, 1, Gender::Male, Vector2D::new(110.0, 100.0)),
    ];
    let plants = vec![plant(&params, 2, Vector2D::new(100.0, 120.0))];
    let scene = Scene::new(&params, &animals, &plants);
    let view = scene.view(&params);

    let me = &animals[0];
    let other = &animals[1];
    let senses = Senses::gather(me, 0, &view);
    let x = senses.inputs(me, &view);

    assert_eq!(x.len(), INPUT_SIZE);
    assert_eq!(x[0], 1.0);
    assert_eq!(x[1], me.core.energy_ratio());
    assert_eq!(x[2], 1.0);
    assert_eq!(x[3], me.core.traits.attractiveness);
    assert_eq!(x[4], 1.0);
    assert_eq!(x[5], 0.0);
    assert_eq!(x[6], 0.0);
    assert_eq!(x[7], 1.0);

    assert!((x[8] - 1.0 / 100.0).abs() < 1e-12);
    assert!(x[9].abs() < 1e-12, "partner lies straight east");
    assert!((x[10] - 1.0 / 400.0).abs() < 1e-12);
    assert!((x[11] - 0.5).abs() < 1e-12, "plant lies straight south");
    assert_eq!(x[12], 1.0);
    assert_eq!(x[13], 1.0);

    assert_eq!(x[14], f64::from(other.core.traits.color[0]) / 255.0);
    assert_eq!(x[15], f64::from(other.core.traits.color[1]) / 255.0);
    assert_eq!(x[16], f64::from(other.core.traits.color[2]) / 255.0);
    assert_eq!(x[17], 1.0, "opposite gender");
    assert_eq!(x[18], 1.0);
    assert_eq!(x[19], 1.0);
    assert_eq!(x[20], 1.0);
    assert_eq!(x[21], other.core.traits.attractiveness);
}

#[test]
fn test_targets_beyond_view_distance_are_only_counted() {
    let params = test_params();
    let me = animal(&params, 0, Gender::Female, Vector2D::new(200.0, 200.0));
    let reach = me.traits.view_distance + me.size() / 4.0;
    assert!(reach < me.sensory_radius());

    let animals = vec![
        me,
        animal(&params, 1, Gender::Male, Vector2D::new(200.0 + reach, 200.0)),
    ];
    let plants = vec![plant(&params, 2, Vector2D::new(200.0, 200.0 - reach))];
    let scene = Scene::new(&params, &animals, &plants);
    let view = scene.view(&params);

    let senses = Senses::gather(&animals[0], 0, &view);
    assert_eq!(senses.animals, vec![1]);
    assert_eq!(senses.plants, vec![0]);
    assert!(senses.animals_in_sight.is_empty());
    assert_eq!(senses.nearest_animal, None);
    assert_eq!(senses.nearest_plant, None);

    let x = senses.inputs(&animals[0], &view);
    assert_eq!(x[8], 0.0);
    assert_eq!(x[10], 0.0);
    assert_eq!(x[12], 1.0);
    assert_eq!(x[13], 1.0);
}

#[test]
fn test_nearest_target_wins() {
    let params = test_params();
    let animals = vec![
        animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0)),
        animal(&params, 1, Gender::Male, Vector2D::new(150.0, 100.0)),
        animal(&params, 2, Gender::Male, Vector2D::new(100.0, 120.0)),
    ];
    let plants = vec![
        plant(&params, 3, Vector2D::new(60.0, 100.0)),
        plant(&params, 4, Vector2D::new(105.0, 95.0)),
    ];
    let scene = Scene::new(&params, &animals, &plants);
    let senses = Senses::gather(&animals[0], 0, &scene.view(&params));
    assert_eq!(senses.nearest_animal, Some(2));
    assert_eq!(senses.nearest_plant, Some(1));
    assert!(!senses.animals.contains(&0), "an animal never senses itself");
}

#[test]
fn test_view_cone_follows_heading() {
    let params = test_params();
    let mut me = animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0));
    me.core.transform.velocity = Vector2D::new(1.0, 0.0);
    me.traits.view_angle = 45.0;

    let behind = vec![
        me.clone(),
        animal(&params, 1, Gender::Male, Vector2D::new(80.0, 100.0)),
    ];
    let scene = Scene::new(&params, &behind, &[]);
    let senses = Senses::gather(&behind[0], 0, &scene.view(&params));
    assert_eq!(senses.animals, vec![1], "still counted");
    assert_eq!(senses.nearest_animal, None, "but not seen");

    let ahead = vec![
        me.clone(),
        animal(&params, 1, Gender::Male, Vector2D::new(120.0, 108.0)),
    ];
    let scene = Scene::new(&params, &ahead, &[]);
    let senses = Senses::gather(&ahead[0], 0, &scene.view(&params));
    assert_eq!(senses.nearest_animal, Some(1));

    me.core.transform.velocity = Vector2D::ZERO;
    let standing = vec![me, animal(&params, 1, Gender::Male, Vector2D::new(80.0, 100.0))];
    let scene = Scene::new(&params, &standing, &[]);
    let senses = Senses::gather(&standing[0], 0, &scene.view(&params));
    assert_eq!(senses.nearest_animal, Some(1), "a standing animal sees all around");
}

#[test]
fn test_in_field_of_view() {
    let here = Vector2D::new(0.0, 0.0);
    let east = Vector2D::new(1.0, 0.0);
    let north_east = Vector2D::new(10.0, -9.0);
    let south = Vector2D::new(0.0, 10.0);
    assert!(in_field_of_view(here, east, 45.0, north_east));
    assert!(!in_field_of_view(here, east, 45.0, south));
    assert!(in_field_of_view(here, east, 100.0, south));
    assert!(in_field_of_view(here, east, 180.0, Vector2D::new(-10.0, 0.0)));
    assert!(!in_field_of_view(here, east, 0.0, north_east));
}

#[test]
fn test_contact_uses_radii() {
    let a = Vector2D::new(0.0, 0.0);
    assert!(in_contact(a, 4.0, Vector2D::new(3.0, 0.0), 2.0));
    assert!(!in_contact(a, 4.0, Vector2D::new(3.5, 0.0), 2.0));
}

#[test]
fn test_appealing_partner_beats_closer_one() {
    let params = test_params();
    let mut animals = vec![
        animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0)),
        animal(&params, 1, Gender::Male, Vector2D::new(120.0, 100.0)),
        animal(&params, 2, Gender::Male, Vector2D::new(100.0, 140.0)),
        animal(&params, 3, Gender::Female, Vector2D::new(105.0, 100.0)),
    ];
    animals[0].reproductive_urge = 50.0;
    animals[2].reproductive_urge = 50.0;
    let scene = Scene::new(&params, &animals, &[]);
    let view = scene.view(&params);

    let senses = Senses::gather(&animals[0], 0, &view);
    assert_eq!(senses.nearest_animal, Some(3));
    assert_eq!(animals[0].choose_mate(&senses, &view), Some(2), "only the eager male accepts");

    animals[2].reproductive_urge = 0.0;
    let scene = Scene::new(&params, &animals, &[]);
    let view = scene.view(&params);
    let senses = Senses::gather(&animals[0], 0, &view);
    assert_eq!(
        animals[0].choose_mate(&senses, &view),
        Some(1),
        "without any willing male the closest eligible one is chosen"
    );
}

#[test]
fn test_acceptance_needs_urge() {
    assert!(!accepts_mate(0.5, 0.0, 1.0));
    assert!(accepts_mate(0.5, 1.0, 0.5));
    assert!(!accepts_mate(0.5, 1.0, 0.4));
    assert!(accepts_mate(0.5, 10.0, 0.06));
}
