//! # Estructura de Job
//! src/jobs/job.rs
//!
//! Un job es un valor inmutable: un nombre (solo para logs) y el trabajo a
//! ejecutar. No guarda referencia a quien lo envió; es fire-and-forget salvo
//! que se cree con [`Job::tracked`].

use std::fmt;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::Duration;

/// Trabajo que ejecuta un job
pub enum Work {
    /// Simula trabajo durmiendo el thread durante la duración indicada
    Sleep(Duration),

    /// Closure arbitraria sin argumentos
    Task(Box<dyn FnOnce() + Send + 'static>),
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Work::Sleep(duration) => f.debug_tuple("Sleep").field(duration).finish(),
            Work::Task(_) => f.write_str("Task(..)"),
        }
    }
}

/// Unidad de trabajo enviada al dispatcher
pub struct Job {
    /// Nombre del job (no es único, solo para trazas)
    name: String,

    /// Trabajo a ejecutar
    work: Work,

    /// Señal de finalización opcional (ver `Job::tracked`)
    completion: Option<SyncSender<()>>,
}

impl Job {
    /// Crea un nuevo job
    pub fn new(name: impl Into<String>, work: Work) -> Self {
        Self {
            name: name.into(),
            work,
            completion: None,
        }
    }

    /// Job que simula trabajo durante `duration`
    ///
    /// # Ejemplo
    /// ```
    /// use std::time::Duration;
    /// use work_dispatcher::jobs::Job;
    ///
    /// let job = Job::sleep("/work", Duration::from_secs(1));
    /// assert_eq!(job.name(), "/work");
    /// ```
    pub fn sleep(name: impl Into<String>, duration: Duration) -> Self {
        Self::new(name, Work::Sleep(duration))
    }

    /// Job que ejecuta una closure
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(name, Work::Task(Box::new(f)))
    }

    /// Adjunta una señal de finalización de un solo uso.
    ///
    /// El `JobHandle` devuelto se resuelve cuando el job terminó de
    /// ejecutarse. Si el job hace panic la señal nunca llega y el handle
    /// reporta que no terminó.
    pub fn tracked(mut self) -> (Self, JobHandle) {
        let (tx, rx) = mpsc::sync_channel(1);
        self.completion = Some(tx);
        (self, JobHandle { rx })
    }

    /// Nombre del job
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trabajo del job
    pub fn work(&self) -> &Work {
        &self.work
    }

    /// Ejecuta el trabajo en el thread actual y consume el job
    pub fn run(self) {
        match self.work {
            Work::Sleep(duration) => thread::sleep(duration),
            Work::Task(task) => task(),
        }

        if let Some(completion) = self.completion {
            // El submitter puede haber descartado el handle
            let _ = completion.try_send(());
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("work", &self.work)
            .field("tracked", &self.completion.is_some())
            .finish()
    }
}

/// Handle para esperar a que un job termine
#[derive(Debug)]
pub struct JobHandle {
    rx: Receiver<()>,
}

impl JobHandle {
    /// Bloquea hasta que el job termine.
    ///
    /// Retorna `false` si el job nunca va a completar (panic o descartado).
    pub fn wait(&self) -> bool {
        self.rx.recv().is_ok()
    }

    /// Como `wait`, pero se rinde tras `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.rx.recv_timeout(timeout).is_ok()
    }
}
