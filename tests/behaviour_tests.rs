#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use ecosim::simulation::brain::NeuralNetwork;
use ecosim::simulation::brain::matrix::Matrix;
use ecosim::simulation::events::Interaction;
use ecosim::simulation::organism::Lifecycle;
use ecosim::simulation::organism::animal::{Animal, Gender, Genome, output};
use ecosim::simulation::organism::perception::{INPUT_SIZE, OUTPUT_SIZE, TickView};
use ecosim::simulation::organism::plant::Plant;
use ecosim::simulation::params::Params;
use ecosim::simulation::vector2d::Vector2D;
use ecosim::simulation::world::World;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn test_params() -> Params {
    let mut params = Params::default();
    params.animal.asexual_chance = 0.0;
    params
}

/// A brain whose outputs ignore the inputs: gates listed in `open` read ~1,
/// every other output ~0.
fn scripted_brain(open: &[usize]) -> NeuralNetwork {
    let hidden = 4;
    let mut bias = [-50.0; OUTPUT_SIZE];
    for &gate in open {
        bias[gate] = 50.0;
    }
    NeuralNetwork::from_parts(
        Matrix::zeros(hidden, INPUT_SIZE),
        Matrix::zeros(OUTPUT_SIZE, hidden),
        Matrix::zeros(hidden, 1),
        Matrix::from_column(&bias),
    )
    .unwrap()
}

fn animal(params: &Params, id: u64, gender: Gender, location: Vector2D, open: &[usize]) -> Animal {
    let genome = Genome::blueprint(&params.species);
    let mut rng = StdRng::seed_from_u64(id);
    let mut animal = Animal::new(id, location, genome, 1.0, 0, params, &mut rng);
    animal.gender = gender;
    animal.brain = scripted_brain(open);
    animal
}

fn plant(params: &Params, location: Vector2D) -> Plant {
    Plant::new(100, location, params.species.plant.to_dna(), 1.0, 0, params)
}

/// Freezes the scene and runs one update of `animals[who]`.
fn update(params: &Params, animals: &mut [Animal], plants: &[Plant], who: usize) -> Vec<Interaction> {
    let mut world = World::new(400.0, 400.0, 4, 4).unwrap();
    for (i, a) in animals.iter().enumerate() {
        world.insert_animal(i, a);
    }
    for (i, p) in plants.iter().enumerate() {
        world.insert_plant(i, p);
    }
    let animal_views: Vec<_> = animals.iter().map(|a| a.view(&params.animal)).collect();
    let plant_views: Vec<_> = plants.iter().map(Plant::view).collect();
    let view = TickView {
        world: &world,
        animals: &animal_views,
        plants: &plant_views,
        params,
        tick: 0,
    };
    animals[who].update(who, &view, &mut StdRng::seed_from_u64(7))
}

#[test]
fn test_closed_gates_request_nothing() {
    let params = test_params();
    let mut animals = vec![
        animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0), &[]),
        animal(&params, 1, Gender::Male, Vector2D::new(105.0, 100.0), &[]),
    ];
    let plants = vec![plant(&params, Vector2D::new(100.0, 104.0))];
    let health = animals[0].core.health();
    let energy = animals[0].core.energy();

    let out = update(&params, &mut animals, &plants, 0);
    assert!(out.is_empty());
    let me = &animals[0];
    assert_eq!(me.reproductive_urge, 0.0);
    assert_eq!(me.core.health(), health);
    assert!(me.core.energy() < energy, "living costs energy");
    assert!(me.core.transform.speed() < 1e-12);
}

#[test]
fn test_eating_gate_bites_touching_plant() {
    let params = test_params();
    let mut animals = vec![animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0), &[output::EATING])];
    let plants = vec![plant(&params, Vector2D::new(100.0, 104.0))];
    let damage = animals[0].traits.strength * params.animal.damage_factor;

    let out = update(&params, &mut animals, &plants, 0);
    assert_eq!(out, vec![Interaction::Eat { animal: 0, plant: 0, damage }]);

    let far = vec![plant(&params, Vector2D::new(100.0, 150.0))];
    assert!(update(&params, &mut animals, &far, 0).is_empty(), "plant out of reach");
}

#[test]
fn test_mating_gate_requests_touching_partner() {
    let params = test_params();
    let mut animals = vec![
        animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0), &[output::MATING]),
        animal(&params, 1, Gender::Male, Vector2D::new(105.0, 100.0), &[]),
    ];
    let out = update(&params, &mut animals, &[], 0);
    assert_eq!(out, vec![Interaction::Mate { initiator: 0, partner: 1 }]);
    assert!((animals[0].reproductive_urge - params.animal.reproductive_urge_factor).abs() < 1e-9);
}

#[test]
fn test_mating_gate_steers_towards_distant_partner() {
    let params = test_params();
    let mut animals = vec![
        animal(&params, 0, Gender::Female, Vector2D::new(100.0, 100.0), &[output::MATING]),
        animal(&params, 1, Gender::Male, Vector2D::new(150.0, 100.0), &[]),
    ];
    let out = update(&params, &mut animals, &[], 0);
    assert!(out.is_empty());
    let velocity = animals[0].core.transform.velocity;
    assert!(velocity.x > 0.0);
    assert!(velocity.y.abs() < 1e-9);
}

#[test]
fn test_attack_needs_strength_and_scales_with_speed_squared() {
    let params = test_params();
    let mut animals = vec![
        animal(&params, 0, Gender::Male, Vector2D::new(100.0, 100.0), &[output::ATTACK]),
        animal(&params, 1, Gender::Female, Vector2D::new(106.0, 100.0), &[]),
    ];
    animals[0].core.transform.velocity = Vector2D::new(0.5, 0.0);
    let strength = animals[0].traits.strength;

    let out = update(&params, &mut animals, &[], 0);
    assert_eq!(
        out,
        vec![Interaction::Attack {
            attacker: 0,
            target: 1,
            damage: strength * params.animal.attack_factor * 0.25,
        }]
    );

    animals[0].core.transform.location = Vector2D::new(100.0, 100.0);
    animals[0].core.transform.velocity = Vector2D::new(0.5, 0.0);
    animals[0].traits.strength = animals[1].traits.strength - 1.0;
    assert!(update(&params, &mut animals, &[], 0).is_empty(), "weaker animals do not attack");
}

#[test]
fn test_growth_gate_matures() {
    let params = test_params();
    let genome = Genome::blueprint(&params.species);
    let mut rng = StdRng::seed_from_u64(0);
    let mut young = Animal::new(0, Vector2D::new(100.0, 100.0), genome, 0.6, 0, &params, &mut rng);
    young.brain = scripted_brain(&[output::GROWTH]);
    let size = young.core.transform.size;
    let mut animals = vec![young];

    update(&params, &mut animals, &[], 0);
    assert!(animals[0].core.maturity > 0.6);
    assert!(animals[0].core.transform.size > size);
}

#[test]
fn test_healing_gate_trades_energy_for_health() {
    let params = test_params();
    let mut animals = vec![animal(&params, 0, Gender::Male, Vector2D::new(100.0, 100.0), &[output::HEALING])];
    animals[0].core.take_damage(5.0);
    let health = animals[0].core.health();
    let energy = animals[0].core.energy();

    update(&params, &mut animals, &[], 0);
    let healed = animals[0].core.health() - health;
    assert!((healed - params.animal.healing_factor).abs() < 1e-9);
    assert!(animals[0].core.energy() < energy - params.animal.healing_factor + 1e-9);
}

#[test]
fn test_herding_gate_keeps_distance() {
    let params = test_params();
    let mut still = vec![
        animal(&params, 0, Gender::Male, Vector2D::new(100.0, 100.0), &[]),
        animal(&params, 1, Gender::Male, Vector2D::new(110.0, 100.0), &[]),
    ];
    update(&params, &mut still, &[], 0);
    assert!(still[0].core.transform.speed() < 1e-12);

    let mut herding = vec![
        animal(&params, 0, Gender::Male, Vector2D::new(100.0, 100.0), &[output::HERDING]),
        animal(&params, 1, Gender::Male, Vector2D::new(110.0, 100.0), &[]),
    ];
    update(&params, &mut herding, &[], 0);
    assert!(herding[0].core.transform.velocity.x < 0.0, "separation outweighs cohesion");
}
