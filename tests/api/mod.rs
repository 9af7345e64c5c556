mod pokemons;
mod types;
