//! Mood/genre picker: two option lists, one active at a time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerField {
    Mood,
    Genre,
}

#[derive(Debug, Clone)]
pub struct Picker {
    pub moods: Vec<String>,
    pub genres: Vec<String>,
    /// `None` = nothing chosen yet.
    pub mood: Option<usize>,
    pub genre: Option<usize>,
    pub field: PickerField,
}

impl Picker {
    pub fn new(moods: Vec<String>, genres: Vec<String>) -> Self {
        Self {
            moods,
            genres,
            mood: None,
            genre: None,
            field: PickerField::Mood,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            PickerField::Mood => PickerField::Genre,
            PickerField::Genre => PickerField::Mood,
        };
    }

    /// Moves the active field's choice by `step`, wrapping. From "nothing
    /// chosen", forward lands on the first option and back on the last.
    pub fn cycle(&mut self, step: isize) {
        let (options, current) = match self.field {
            PickerField::Mood => (&self.moods, &mut self.mood),
            PickerField::Genre => (&self.genres, &mut self.genre),
        };
        let len = options.len();
        if len == 0 {
            return;
        }
        *current = Some(match *current {
            None if step >= 0 => 0,
            None => len - 1,
            Some(i) => (i as isize + step).rem_euclid(len as isize) as usize,
        });
    }

    pub fn clear_field(&mut self) {
        match self.field {
            PickerField::Mood => self.mood = None,
            PickerField::Genre => self.genre = None,
        }
    }

    pub fn selected_mood(&self) -> Option<&str> {
        self.mood.and_then(|i| self.moods.get(i)).map(String::as_str)
    }

    pub fn selected_genre(&self) -> Option<&str> {
        self.genre.and_then(|i| self.genres.get(i)).map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.mood = None;
        self.genre = None;
        self.field = PickerField::Mood;
    }
}
