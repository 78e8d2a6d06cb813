//! Multi-threaded evolution engine.
//!
//! Worker threads share one population behind a mutex. Each worker loops:
//!
//! 1. lock, select parents, unlock
//! 2. breed offspring (crossover, mutation, evaluation) without the lock
//! 3. lock, replace the weakest members, advance statistics, check the stop
//!    criteria, unlock
//!
//! Step 3 is the generation boundary: every completed replacement is one
//! generation, and the statistics observed by the criteria never belong to
//! a half-applied step. Offspring that arrive after the run has stopped
//! are discarded.
//!
//! Notifications go out on a [`crossbeam_channel`] so consumers never run
//! on a worker thread.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use u_interview::config::EngineConfig;
//! use u_interview::engine::{EngineEvent, EvolutionEngine};
//! use u_interview::models::{SchedulingContext, Student, Subject, Tutor};
//!
//! let context = SchedulingContext::new(
//!     vec![Subject::new(1, "Maths")],
//!     vec![Tutor::new(1, "Ada").with_subject(1, 1.0)],
//!     vec![Student::new(1, "Bob", 1)],
//!     12,
//! )
//! .unwrap();
//!
//! let mut engine = EvolutionEngine::new(Arc::new(context), EngineConfig::default()).unwrap();
//! let events = engine.events();
//! engine.start_solving(false).unwrap();
//! for event in events.iter() {
//!     if let EngineEvent::StateChanged(state) = event {
//!         if state.is_stopped() {
//!             break;
//!         }
//!     }
//! }
//! engine.wait_for_threads();
//! let best = engine.best_chromosome().unwrap();
//! println!("best fitness {:.4}", best.fitness());
//! ```

mod state;

pub use state::{EngineEvent, EngineState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::criteria::StopCriteria;
use crate::error::{Error, Result};
use crate::ga::{breed, FitnessEvaluator, Population, TimetableChromosome};
use crate::models::{InstanceId, SchedulingContext};
use crate::seed::SeedSolution;
use crate::statistics::{Statistics, StatisticsValue};

/// Spreads per-run seeds apart so resumed runs don't replay earlier ones.
const RUN_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Mutable run state, guarded by [`Shared::run`].
struct Run {
    context: Arc<SchedulingContext>,
    population: Option<Population>,
    statistics: Statistics,
    criteria: StopCriteria,
    state: EngineState,
    best_fitness: f64,
    last_error: Option<Error>,
}

/// State shared between the engine handle and its workers.
struct Shared {
    config: EngineConfig,
    evaluator: FitnessEvaluator,
    run: Mutex<Run>,
    cancel: Arc<AtomicBool>,
    events: Sender<EngineEvent>,
}

impl Shared {
    /// Locks the run state. A worker that panicked while holding the lock
    /// cannot have left it half-written, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Run> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: EngineEvent) {
        // The engine owns a receiver, so sending only fails during teardown.
        let _ = self.events.send(event);
    }

    fn work(&self, worker: usize, mut rng: SmallRng) {
        debug!(worker, "worker started");
        let population_config = &self.config.population;

        while !self.cancel.load(Ordering::Acquire) {
            let (context, parents) = {
                let run = self.lock();
                if !run.state.is_running() {
                    break;
                }
                let Some(population) = run.population.as_ref() else {
                    break;
                };
                (
                    Arc::clone(&run.context),
                    population.select_parents(population_config, &mut rng),
                )
            };

            let offspring = match breed(
                &parents,
                &context,
                population_config,
                &self.config.operators,
                &self.evaluator,
                &mut rng,
            ) {
                Ok(offspring) => offspring,
                Err(e) => {
                    self.abort(worker, e);
                    break;
                }
            };

            if !self.complete_generation(offspring) {
                break;
            }
        }

        if self.cancel.load(Ordering::Acquire) {
            self.mark_user_stopped();
        }
        debug!(worker, "worker exiting");
    }

    /// Moves a running engine to `UserStopped`. No-op in any other state.
    fn mark_user_stopped(&self) {
        let mut run = self.lock();
        if run.state.is_running() {
            run.state = EngineState::UserStopped;
            info!(generation = run.statistics.generation(), "evolution stopped by user");
            self.publish(EngineEvent::StateChanged(EngineState::UserStopped));
        }
    }

    /// Applies one generation's offspring. Returns `false` once the run is over.
    fn complete_generation(&self, offspring: Vec<TimetableChromosome>) -> bool {
        let mut guard = self.lock();
        let Run {
            population,
            statistics,
            criteria,
            state,
            best_fitness,
            ..
        } = &mut *guard;

        if !state.is_running() {
            return false;
        }
        let Some(population) = population.as_mut() else {
            return false;
        };

        population.replace(offspring, self.config.population.elite_count);
        statistics.next_generation();
        population.record(statistics);

        let generation = statistics.generation();
        debug!(
            generation,
            best = statistics.value(StatisticsValue::BestFitness),
            average = statistics.value(StatisticsValue::AverageFitness),
            worst = statistics.value(StatisticsValue::WorstFitness),
            "generation completed"
        );

        if let Some(best) = population.best() {
            if best.fitness() > *best_fitness {
                *best_fitness = best.fitness();
                debug!(generation, fitness = best.fitness(), "new best chromosome");
                self.publish(EngineEvent::NewBest {
                    generation,
                    fitness: best.fitness(),
                    chromosome: best.clone(),
                });
            }
        }

        if criteria.evaluate(statistics) {
            *state = EngineState::CriteriaStopped;
            self.cancel.store(true, Ordering::Release);
            info!(generation, best = *best_fitness, "stop criteria satisfied");
            self.publish(EngineEvent::StateChanged(EngineState::CriteriaStopped));
            return false;
        }
        true
    }

    fn abort(&self, worker: usize, err: Error) {
        // Flag set under the lock so exiting workers see `Aborted`, not a user stop.
        let mut run = self.lock();
        self.cancel.store(true, Ordering::Release);
        if !run.state.is_running() {
            return;
        }
        error!(worker, error = %err, "aborting run");
        run.state = EngineState::Aborted;
        run.last_error = Some(err);
        self.publish(EngineEvent::StateChanged(EngineState::Aborted));
    }
}

/// Drives the genetic algorithm on background worker threads.
pub struct EvolutionEngine {
    shared: Arc<Shared>,
    events: Receiver<EngineEvent>,
    seed_solution: Option<SeedSolution>,
    workers: Vec<JoinHandle<()>>,
    runs: u64,
}

impl EvolutionEngine {
    /// Creates an idle engine for a scheduling instance.
    pub fn new(context: Arc<SchedulingContext>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let criteria = StopCriteria::new(config.stop_criteria.clone())?;
        let (sender, receiver) = crossbeam_channel::unbounded();

        let shared = Shared {
            evaluator: FitnessEvaluator::new(config.weights),
            config,
            run: Mutex::new(Run {
                context,
                population: None,
                statistics: Statistics::default(),
                criteria,
                state: EngineState::NotStarted,
                best_fitness: f64::NEG_INFINITY,
                last_error: None,
            }),
            cancel: Arc::new(AtomicBool::new(false)),
            events: sender,
        };

        Ok(Self {
            shared: Arc::new(shared),
            events: receiver,
            seed_solution: None,
            workers: Vec::new(),
            runs: 0,
        })
    }

    /// Seeds fresh populations from a previously saved solution.
    pub fn with_seed_solution(mut self, seed: SeedSolution) -> Self {
        self.seed_solution = Some(seed);
        self
    }

    pub fn set_seed_solution(&mut self, seed: Option<SeedSolution>) {
        self.seed_solution = seed;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// A receiver for engine events. Every clone competes for the same
    /// events, so use a single consumer. Events still queued when the next
    /// run starts are discarded.
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.events.clone()
    }

    /// Flag that stops the run when set. Equivalent to
    /// [`stop_solving`](Self::stop_solving), except that the state moves to
    /// `UserStopped` only once a worker notices the flag.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shared.cancel)
    }

    /// Starts a run on `config.workers` threads.
    ///
    /// With `resume == false` (or when there is no population to resume) the
    /// population is re-seeded and statistics restart from generation zero.
    /// Resuming keeps the population and generation counter.
    pub fn start_solving(&mut self, resume: bool) -> Result<()> {
        if self.state().is_running() {
            return Err(Error::AlreadyRunning);
        }
        self.wait_for_threads();

        self.runs += 1;
        let base_seed = self
            .shared
            .config
            .seed
            .unwrap_or_else(rand::random)
            .wrapping_add(self.runs.wrapping_mul(RUN_SEED_STRIDE));

        {
            let mut guard = self.shared.lock();
            let run = &mut *guard;
            let resume = resume && run.population.is_some();

            if !resume {
                let mut rng = SmallRng::seed_from_u64(base_seed);
                let population = Population::seed(
                    &run.context,
                    &self.shared.config.population,
                    &self.shared.evaluator,
                    self.seed_solution.as_ref(),
                    &mut rng,
                );
                run.statistics.reset();
                population.record(&mut run.statistics);
                run.best_fitness = f64::NEG_INFINITY;
                run.population = Some(population);
            }
            let stale = self.events.try_iter().count();
            if stale > 0 {
                debug!(stale, "discarding unconsumed events");
            }

            run.criteria.reset();
            run.last_error = None;
            run.state = EngineState::Running;
            self.shared.cancel.store(false, Ordering::Release);

            info!(
                resume,
                generation = run.statistics.generation(),
                workers = self.shared.config.workers,
                instances = run.context.instance_count(),
                "starting evolution"
            );
            self.shared.publish(EngineEvent::StateChanged(EngineState::Running));

            if let Some(best) = run.population.as_ref().and_then(Population::best) {
                if best.fitness() > run.best_fitness {
                    run.best_fitness = best.fitness();
                    self.shared.publish(EngineEvent::NewBest {
                        generation: run.statistics.generation(),
                        fitness: best.fitness(),
                        chromosome: best.clone(),
                    });
                }
            }
        }

        for worker in 0..self.shared.config.workers {
            let shared = Arc::clone(&self.shared);
            let rng = SmallRng::seed_from_u64(base_seed.wrapping_add(worker as u64 + 1));
            let spawned = thread::Builder::new()
                .name(format!("u-interview-worker-{worker}"))
                .spawn(move || shared.work(worker, rng));
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    // Workers already spawned see the stop and exit.
                    self.stop_solving();
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Asks the workers to stop at their next generation boundary.
    pub fn stop_solving(&self) {
        self.shared.cancel.store(true, Ordering::Release);
        self.shared.mark_user_stopped();
    }

    /// Blocks until every worker thread has exited.
    pub fn wait_for_threads(&mut self) {
        let mut panicked = 0usize;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked += 1;
            }
        }
        if panicked == 0 {
            return;
        }

        warn!(panicked, "worker threads panicked");
        let mut run = self.shared.lock();
        if run.state.is_running() {
            run.state = EngineState::Aborted;
            run.last_error = Some(Error::invariant(format!(
                "{panicked} worker thread(s) panicked"
            )));
            self.shared.publish(EngineEvent::StateChanged(EngineState::Aborted));
        }
    }

    pub fn state(&self) -> EngineState {
        self.shared.lock().state
    }

    /// Snapshot of the current statistics.
    pub fn statistics(&self) -> Statistics {
        self.shared.lock().statistics.clone()
    }

    /// Completed generations in the current run.
    pub fn generation(&self) -> u64 {
        self.shared.lock().statistics.generation()
    }

    pub fn context(&self) -> Arc<SchedulingContext> {
        Arc::clone(&self.shared.lock().context)
    }

    /// The fittest member of the current population.
    pub fn best_chromosome(&self) -> Option<TimetableChromosome> {
        let run = self.shared.lock();
        run.population.as_ref()?.best().cloned()
    }

    /// Slot → instances table of the best chromosome.
    pub fn slot_table(&self) -> Option<Vec<Vec<InstanceId>>> {
        let run = self.shared.lock();
        Some(run.population.as_ref()?.best()?.slots().to_vec())
    }

    /// Slot of an instance in the best chromosome.
    pub fn placement_of(&self, id: InstanceId) -> Option<usize> {
        let run = self.shared.lock();
        run.population.as_ref()?.best()?.slot_of(id)
    }

    /// Best chromosomes seen during the run, fittest first.
    pub fn tracked_best(&self) -> Vec<TimetableChromosome> {
        let run = self.shared.lock();
        run.population
            .as_ref()
            .map(|p| p.tracked_best().to_vec())
            .unwrap_or_default()
    }

    /// Worst chromosomes seen during the run, weakest first.
    pub fn tracked_worst(&self) -> Vec<TimetableChromosome> {
        let run = self.shared.lock();
        run.population
            .as_ref()
            .map(|p| p.tracked_worst().to_vec())
            .unwrap_or_default()
    }

    /// Message of the error that aborted the last run.
    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.as_ref().map(ToString::to_string)
    }

    /// Swaps in an edited scheduling instance between runs.
    ///
    /// A retained population is re-evaluated against the new context when
    /// it expands to the same instances over the same slots; otherwise it
    /// is dropped and the next run re-seeds regardless of `resume`.
    pub fn set_context(&mut self, context: Arc<SchedulingContext>) -> Result<()> {
        if self.state().is_running() {
            return Err(Error::AlreadyRunning);
        }
        self.wait_for_threads();

        let mut guard = self.shared.lock();
        let run = &mut *guard;
        let compatible = run.context.num_slots() == context.num_slots()
            && run.context.instance_ids() == context.instance_ids();
        run.context = context;

        if run.population.is_some() && !compatible {
            run.population = None;
            info!("context replaced; instance set changed, population dropped");
        } else if let Some(population) = run.population.as_mut() {
            population.evaluate_all(&run.context, &self.shared.evaluator);
            population.record(&mut run.statistics);
            run.best_fitness = population
                .best()
                .map_or(f64::NEG_INFINITY, TimetableChromosome::fitness);
            info!("context replaced; population re-evaluated");
        }
        Ok(())
    }
}

impl Drop for EvolutionEngine {
    fn drop(&mut self) {
        self.stop_solving();
        self.wait_for_threads();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Comparison, FitnessCriterion, GenerationCriterion, StopCriterion};
    use crate::ga::PopulationConfig;
    use crate::models::{Student, Subject, Tutor};

    fn context() -> Arc<SchedulingContext> {
        let ctx = SchedulingContext::new(
            vec![Subject::new(1, "Maths"), Subject::new(2, "Physics")],
            vec![
                Tutor::new(1, "T1").with_subject(1, 1.0),
                Tutor::new(2, "T2").with_subject(2, 1.0).with_blocked_time(3),
            ],
            (1..=6u32)
                .map(|i| Student::new(i, format!("S{i}"), 1 + i % 2))
                .collect(),
            12,
        )
        .unwrap();
        Arc::new(ctx)
    }

    fn config(criterion: impl Into<StopCriterion>) -> EngineConfig {
        EngineConfig::default()
            .with_population(PopulationConfig {
                size: 20,
                selection_size: 8,
                parent_count: 4,
                offspring_count: 4,
                elite_count: 2,
                ..Default::default()
            })
            .with_workers(2)
            .with_seed(42)
            .with_stop_criteria(vec![criterion.into()])
    }

    fn endless() -> StopCriterion {
        GenerationCriterion::new(u64::MAX).unwrap().into()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = EvolutionEngine::new(context(), EngineConfig::default().with_workers(0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_idle_engine() {
        let engine = EvolutionEngine::new(context(), config(endless())).unwrap();
        assert_eq!(engine.state(), EngineState::NotStarted);
        assert!(engine.best_chromosome().is_none());
        assert!(engine.slot_table().is_none());
        assert!(engine.tracked_best().is_empty());
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn test_generation_criterion_stops_run() {
        let mut engine =
            EvolutionEngine::new(context(), config(GenerationCriterion::new(20).unwrap())).unwrap();
        let events = engine.events();
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();

        assert_eq!(engine.state(), EngineState::CriteriaStopped);
        assert_eq!(engine.generation(), 20);

        let received: Vec<EngineEvent> = events.try_iter().collect();
        assert!(matches!(
            received.first(),
            Some(EngineEvent::StateChanged(EngineState::Running))
        ));
        assert!(matches!(
            received.last(),
            Some(EngineEvent::StateChanged(EngineState::CriteriaStopped))
        ));
        let mut last_best = f64::NEG_INFINITY;
        for event in &received {
            if let EngineEvent::NewBest { fitness, chromosome, .. } = event {
                assert!(*fitness > last_best);
                assert!((chromosome.fitness() - fitness).abs() < 1e-12);
                last_best = *fitness;
            }
        }
        assert!(last_best > f64::NEG_INFINITY);

        let best = engine.best_chromosome().unwrap();
        assert!((best.fitness() - last_best).abs() < 1e-12);
        assert!(best.check_instances(&engine.context().instance_ids()).is_ok());
    }

    #[test]
    fn test_best_exposed_through_tables() {
        let mut engine =
            EvolutionEngine::new(context(), config(GenerationCriterion::new(5).unwrap())).unwrap();
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();

        let best = engine.best_chromosome().unwrap();
        let table = engine.slot_table().unwrap();
        assert_eq!(table.len(), engine.context().num_slots());
        for id in engine.context().instance_ids() {
            let slot = engine.placement_of(id).unwrap();
            assert_eq!(Some(slot), best.slot_of(id));
            assert!(table[slot].contains(&id));
        }
        assert!(!engine.tracked_best().is_empty());
        assert!(!engine.tracked_worst().is_empty());
        let stats = engine.statistics();
        assert!((stats.value(StatisticsValue::PopulationSize) - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_fitness_criterion_stops_after_first_generation() {
        let criterion = FitnessCriterion::new(
            StatisticsValue::BestFitness,
            Comparison::GREATER_THAN | Comparison::EQUAL,
            0.0,
        )
        .unwrap();
        let mut engine = EvolutionEngine::new(context(), config(criterion)).unwrap();
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();

        assert_eq!(engine.state(), EngineState::CriteriaStopped);
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn test_user_stop() {
        let mut engine = EvolutionEngine::new(context(), config(endless())).unwrap();
        let events = engine.events();
        engine.start_solving(false).unwrap();
        engine.stop_solving();
        engine.wait_for_threads();

        assert_eq!(engine.state(), EngineState::UserStopped);
        assert!(events
            .try_iter()
            .any(|e| matches!(e, EngineEvent::StateChanged(EngineState::UserStopped))));
        assert!(engine.best_chromosome().is_some());
    }

    #[test]
    fn test_cancel_handle_stops_run() {
        let mut engine = EvolutionEngine::new(context(), config(endless())).unwrap();
        let events = engine.events();
        engine.start_solving(false).unwrap();
        engine.cancel_handle().store(true, Ordering::Release);
        engine.wait_for_threads();

        assert_eq!(engine.state(), EngineState::UserStopped);
        let stops = events
            .try_iter()
            .filter(|e| matches!(e, EngineEvent::StateChanged(EngineState::UserStopped)))
            .count();
        assert_eq!(stops, 1);

        engine.start_solving(true).unwrap();
        assert!(engine.state().is_running());
        engine.stop_solving();
        engine.wait_for_threads();
        assert_eq!(engine.state(), EngineState::UserStopped);
    }

    #[test]
    fn test_unconsumed_events_discarded_on_start() {
        let mut engine =
            EvolutionEngine::new(context(), config(GenerationCriterion::new(5).unwrap())).unwrap();
        let events = engine.events();
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();
        assert!(events.len() >= 2);

        engine.start_solving(false).unwrap();
        assert!(matches!(
            events.try_recv(),
            Ok(EngineEvent::StateChanged(EngineState::Running))
        ));
        engine.wait_for_threads();
        assert!(matches!(
            events.try_iter().last(),
            Some(EngineEvent::StateChanged(EngineState::CriteriaStopped))
        ));
    }

    #[test]
    fn test_start_while_running_fails() {
        let mut engine = EvolutionEngine::new(context(), config(endless())).unwrap();
        engine.start_solving(false).unwrap();
        assert!(matches!(engine.start_solving(true), Err(Error::AlreadyRunning)));
        assert!(matches!(engine.set_context(context()), Err(Error::AlreadyRunning)));
        engine.stop_solving();
        engine.wait_for_threads();
    }

    #[test]
    fn test_resume_keeps_generation_counter() {
        let mut engine =
            EvolutionEngine::new(context(), config(GenerationCriterion::new(10).unwrap())).unwrap();
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();
        assert_eq!(engine.generation(), 10);
        let best_before = engine.best_chromosome().unwrap().fitness();

        engine.start_solving(true).unwrap();
        engine.wait_for_threads();
        assert_eq!(engine.state(), EngineState::CriteriaStopped);
        assert_eq!(engine.generation(), 11);
        assert!(engine.best_chromosome().unwrap().fitness() >= best_before);

        engine.start_solving(false).unwrap();
        engine.wait_for_threads();
        assert_eq!(engine.generation(), 10);
    }

    #[test]
    fn test_set_context_between_runs() {
        let mut engine =
            EvolutionEngine::new(context(), config(GenerationCriterion::new(3).unwrap())).unwrap();
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();

        // Same instances, different availability: population survives.
        let mut edited = (*context()).clone();
        edited
            .set_tutor_blocked_times(crate::models::TutorId(1), 0..12)
            .unwrap();
        engine.set_context(Arc::new(edited)).unwrap();
        let best = engine.best_chromosome().unwrap();
        let evaluator = FitnessEvaluator::new(engine.config().weights);
        assert!((best.fitness() - evaluator.evaluate(&engine.context(), &best)).abs() < 1e-12);

        // Different instance set: population is dropped.
        let larger = SchedulingContext::new(
            vec![Subject::new(1, "Maths")],
            vec![Tutor::new(1, "T1").with_subject(1, 1.0)],
            (1..=3u32).map(|i| Student::new(i, format!("S{i}"), 1)).collect(),
            12,
        )
        .unwrap();
        engine.set_context(Arc::new(larger)).unwrap();
        assert!(engine.best_chromosome().is_none());

        engine.start_solving(true).unwrap();
        engine.wait_for_threads();
        assert_eq!(engine.generation(), 3);
        assert_eq!(engine.best_chromosome().unwrap().instance_count(), 3);
    }

    #[test]
    fn test_abort_records_error() {
        let mut engine = EvolutionEngine::new(context(), config(endless())).unwrap();
        let events = engine.events();
        engine.start_solving(false).unwrap();
        engine.shared.abort(0, Error::invariant("reverse map drift"));
        engine.wait_for_threads();

        assert_eq!(engine.state(), EngineState::Aborted);
        assert!(engine.last_error().unwrap().contains("reverse map drift"));
        assert!(events
            .try_iter()
            .any(|e| matches!(e, EngineEvent::StateChanged(EngineState::Aborted))));

        engine.start_solving(false).unwrap();
        assert!(engine.last_error().is_none());
        engine.stop_solving();
        engine.wait_for_threads();
    }

    #[test]
    fn test_seeded_start() {
        let ctx = context();
        let first = ctx.instances()[0].clone();
        let mut seed = SeedSolution::new();
        seed.insert(5, first.base_id);

        let engine_config = EngineConfig {
            population: PopulationConfig {
                size: 20,
                selection_size: 8,
                parent_count: 4,
                offspring_count: 4,
                elite_count: 2,
                seeded_members: 20,
                ..Default::default()
            },
            ..config(GenerationCriterion::new(1).unwrap())
        };
        let mut engine = EvolutionEngine::new(ctx, engine_config)
            .unwrap()
            .with_seed_solution(seed);
        engine.start_solving(false).unwrap();
        engine.wait_for_threads();

        // Every member started from the seed; one generation can't displace all of them.
        let seeded = engine
            .tracked_best()
            .iter()
            .chain(engine.tracked_worst().iter())
            .any(|c| c.slot_of(first.id) == Some(5));
        assert!(seeded);
    }
}
